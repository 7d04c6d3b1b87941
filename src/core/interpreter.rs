//! Heuristic text-to-criteria translation.
//!
//! Every signal is extracted by an independent matcher function; cascades
//! (follower thresholds, result counts) are ordered pattern lists evaluated
//! with early exit on the first acceptable match. Nothing here fails: text
//! without any recognizable signal yields empty criteria.

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::core::taxonomy::Taxonomy;
use crate::models::{Platform, Region, SearchCriteria, MAX_RESULT_LIMIT};

/// Platform vocabulary; `true` marks abbreviations that must match a whole word
const PLATFORM_TERMS: &[(&str, Platform, bool)] = &[
    ("twitch", Platform::Twitch, false),
    ("ttv", Platform::Twitch, true),
    ("youtube", Platform::YouTube, false),
    ("yt", Platform::YouTube, true),
    ("kick", Platform::Kick, true),
    ("kick.com", Platform::Kick, false),
    ("tiktok", Platform::TikTok, false),
    ("tik tok", Platform::TikTok, false),
    ("instagram", Platform::Instagram, false),
    ("insta", Platform::Instagram, true),
    ("ig", Platform::Instagram, true),
];

/// Locale names, demonyms and unambiguous country codes
const REGION_TERMS: &[(&str, Region)] = &[
    ("mexico", Region::Mexico),
    ("méxico", Region::Mexico),
    ("mexican", Region::Mexico),
    ("mexicans", Region::Mexico),
    ("mexicano", Region::Mexico),
    ("mexicanos", Region::Mexico),
    ("cdmx", Region::Mexico),
    ("mx", Region::Mexico),
    ("guatemala", Region::Guatemala),
    ("guatemalan", Region::Guatemala),
    ("guatemalteco", Region::Guatemala),
    ("gt", Region::Guatemala),
    ("honduras", Region::Honduras),
    ("honduran", Region::Honduras),
    ("hondureño", Region::Honduras),
    ("el salvador", Region::ElSalvador),
    ("salvadoran", Region::ElSalvador),
    ("salvadoreño", Region::ElSalvador),
    ("nicaragua", Region::Nicaragua),
    ("nicaraguan", Region::Nicaragua),
    ("costa rica", Region::CostaRica),
    ("costa rican", Region::CostaRica),
    ("costarricense", Region::CostaRica),
    ("panama", Region::Panama),
    ("panamá", Region::Panama),
    ("panamanian", Region::Panama),
    ("cuba", Region::Cuba),
    ("cuban", Region::Cuba),
    ("dominican republic", Region::DominicanRepublic),
    ("república dominicana", Region::DominicanRepublic),
    ("republica dominicana", Region::DominicanRepublic),
    ("dominican", Region::DominicanRepublic),
    ("puerto rico", Region::PuertoRico),
    ("puerto rican", Region::PuertoRico),
    ("boricua", Region::PuertoRico),
    ("colombia", Region::Colombia),
    ("colombian", Region::Colombia),
    ("colombiano", Region::Colombia),
    ("venezuela", Region::Venezuela),
    ("venezuelan", Region::Venezuela),
    ("venezolano", Region::Venezuela),
    ("ecuador", Region::Ecuador),
    ("ecuadorian", Region::Ecuador),
    ("ecuatoriano", Region::Ecuador),
    ("peru", Region::Peru),
    ("perú", Region::Peru),
    ("peruvian", Region::Peru),
    ("peruano", Region::Peru),
    ("bolivia", Region::Bolivia),
    ("bolivian", Region::Bolivia),
    ("chile", Region::Chile),
    ("chilean", Region::Chile),
    ("chileno", Region::Chile),
    ("cl", Region::Chile),
    ("argentina", Region::Argentina),
    ("argentine", Region::Argentina),
    ("argentinian", Region::Argentina),
    ("argentino", Region::Argentina),
    ("uruguay", Region::Uruguay),
    ("uruguayan", Region::Uruguay),
    ("uruguayo", Region::Uruguay),
    ("uy", Region::Uruguay),
    ("paraguay", Region::Paraguay),
    ("paraguayan", Region::Paraguay),
    ("paraguayo", Region::Paraguay),
    ("py", Region::Paraguay),
    ("brazil", Region::Brazil),
    ("brasil", Region::Brazil),
    ("brazilian", Region::Brazil),
    ("brasileño", Region::Brazil),
    ("br", Region::Brazil),
    ("united states", Region::UnitedStates),
    ("usa", Region::UnitedStates),
    ("estados unidos", Region::UnitedStates),
    ("canada", Region::Canada),
    ("canadá", Region::Canada),
    ("canadian", Region::Canada),
    ("spain", Region::Spain),
    ("españa", Region::Spain),
    ("portugal", Region::Portugal),
    ("united kingdom", Region::UnitedKingdom),
    ("uk", Region::UnitedKingdom),
    ("british", Region::UnitedKingdom),
    ("france", Region::France),
    ("francia", Region::France),
    ("germany", Region::Germany),
    ("alemania", Region::Germany),
    ("italy", Region::Italy),
    ("italia", Region::Italy),
    ("philippines", Region::Philippines),
    ("filipinas", Region::Philippines),
    ("filipino", Region::Philippines),
    ("ph", Region::Philippines),
    ("japan", Region::Japan),
    ("japón", Region::Japan),
    ("south korea", Region::SouthKorea),
    ("korea", Region::SouthKorea),
    ("corea", Region::SouthKorea),
    ("india", Region::India),
];

/// Language vocabulary mapped to ISO 639-1 codes, in priority order
const LANGUAGE_TERMS: &[(&str, &str)] = &[
    ("spanish|español|espanol|castellano|hispanohablantes?|spanish-speaking|habla hispana", "es"),
    ("english|inglés|ingles|english-speaking|anglophone", "en"),
    ("portuguese|portugués|portugues|português|lusophone", "pt"),
    ("french|francés|frances|français|francophone", "fr"),
    ("german|alemán|deutsch", "de"),
    ("italian|italiano", "it"),
    ("japanese|japonés|japones", "ja"),
    ("korean|coreano", "ko"),
];

/// Filler words dropped before the remaining tokens become a tag phrase
const STOP_WORDS: &[&str] = &[
    // English
    "a", "an", "the", "and", "or", "of", "for", "to", "in", "on", "at", "by", "with", "from",
    "about", "into", "who", "whom", "that", "which", "what", "me", "my", "i", "we", "us", "our",
    "you", "your", "they", "them", "their", "his", "her", "is", "are", "be", "do", "does",
    "have", "has", "show", "find", "get", "give", "list", "search", "searching", "look",
    "looking", "need", "want", "please", "some", "any", "all", "more", "than", "over", "above",
    "under", "below", "least", "most", "only", "also", "very", "like", "around", "based",
    "stream", "streams", "streaming", "streamer", "streamers", "creator", "creators", "content",
    "influencer", "influencers", "channel", "channels", "account", "accounts", "people",
    "profile", "profiles", "result", "results", "top", "first", "best", "good", "great",
    "popular", "big", "play", "plays", "playing", "make", "makes", "making", "can", "could",
    "would", "should", "just", "now", "currently", "right", "up", "max", "maximum", "limit",
    "minimum", "min", "least", "plus", "other", "others", "speaking", "speak", "speaks",
    // Spanish
    "el", "la", "los", "las", "un", "una", "unos", "unas", "de", "del", "en", "con", "para",
    "por", "que", "y", "o", "al", "mas", "más", "sobre", "menos", "muestra", "muéstrame",
    "muestrame", "dame", "busca", "buscame", "búscame", "necesito", "quiero", "encuentra",
    "creadores", "canales", "perfiles", "resultados", "juegan", "juega", "hacen", "hablan",
    "habla", "mejores", "primeros", "primeras", "hasta", "tengan", "tienen", "como", "sus",
];

/// Words of the feature vocabularies (live, camera, audience size ...)
const FEATURE_WORDS: &[&str] = &[
    "live", "vivo", "directo", "online", "offline", "air", "aire", "vtuber", "vtubers",
    "v-tuber", "v-tubers", "virtual", "youtuber", "youtubers", "camera", "cam", "cams", "webcam",
    "webcams", "facecam", "facecams", "face", "faceless", "cámara", "camara", "sin", "no",
    "without", "followers", "follower", "seguidores", "subs", "subscribers", "suscriptores",
    "viewers", "viewer", "espectadores", "million", "millions", "millones", "millón", "millon",
    "mil", "k", "m", "audience", "latam", "latin", "america", "american", "americans",
    "americas", "latinoamérica", "latinoamerica",
    "hispanoamérica", "europe", "europa", "asia", "apac", "caribbean", "caribe", "iberia",
    "iberian", "central", "south", "north", "centroamérica", "centroamerica", "sudamérica",
    "sudamerica", "suramérica", "norteamérica", "norteamerica", "speaking", "hispana",
];

/// Phrases containing "live" that describe content rather than live status
static LIVE_CONTENT_PHRASES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blive\s+(casino|dealer|dealers|games?|betting)\b").expect("valid regex"));
static LIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(live now|live|en vivo|en directo|streaming now|currently streaming|online now|on air|al aire)\b")
        .expect("valid regex")
});
static NOT_LIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(offline|not live|no en vivo)\b").expect("valid regex"));
static VTUBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(vtubers?|v-tubers?|virtual youtubers?|virtual streamers?)\b").expect("valid regex")
});
static NO_CAMERA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(no cam|no camera|no face ?cam|without (a )?(camera|webcam|face ?cam)|sin c[aá]mara|faceless)\b")
        .expect("valid regex")
});
static CAMERA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(face ?cams?|webcams?|on cam(era)?|with (a )?(camera|webcam)|uses? (a )?(camera|webcam)|shows? (their |his |her )?face|con c[aá]mara)\b")
        .expect("valid regex")
});
static NUMERIC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d[\d,.]*(k|m|mil)?\+?$").expect("valid regex"));
/// Magnitude or audience word right after a number: it is not a result count
static COUNT_DISQUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(million|millions|millones|mill[oó]n|mil\b|m\b|k\b|\+|followers|seguidores|subs|subscribers|suscriptores|viewers|espectadores)")
        .expect("valid regex")
});

static PLATFORM_MATCHERS: LazyLock<Vec<(Regex, Platform)>> = LazyLock::new(|| {
    PLATFORM_TERMS
        .iter()
        .map(|(term, platform, whole_word)| {
            let pattern = if *whole_word {
                format!(r"\b{}\b", regex::escape(term))
            } else {
                regex::escape(term)
            };
            (Regex::new(&pattern).expect("valid regex"), *platform)
        })
        .collect()
});

static REGION_MATCHERS: LazyLock<Vec<(Regex, Region)>> = LazyLock::new(|| {
    REGION_TERMS
        .iter()
        .map(|(term, region)| {
            let regex = Regex::new(&format!(r"\b{}\b", regex::escape(term))).expect("valid regex");
            (regex, *region)
        })
        .collect()
});

static LANGUAGE_MATCHERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    LANGUAGE_TERMS
        .iter()
        .map(|(alternatives, code)| {
            let regex = Regex::new(&format!(r"\b({})\b", alternatives)).expect("valid regex");
            (regex, *code)
        })
        .collect()
});

/// Follower threshold patterns with their magnitude, in priority order
static FOLLOWER_PATTERNS: LazyLock<Vec<(Regex, f64)>> = LazyLock::new(|| {
    let over = r"(?:over|more than|above|at least|minimum of|min|más de|mas de|mínimo|minimo)";
    let audience = r"(?:followers|seguidores|subs|subscribers|suscriptores)";
    [
        (r"(\d+(?:\.\d+)?)\s*(?:million|millions|millones|mill[oó]n)\b".to_string(), 1_000_000.0),
        (format!(r"{}\s+(\d+(?:\.\d+)?)\s*m\b", over), 1_000_000.0),
        (format!(r"{}\s+(\d+(?:\.\d+)?)\s*k\b", over), 1_000.0),
        (format!(r"(\d+(?:\.\d+)?)\s*m\s+{}", audience), 1_000_000.0),
        (r"(\d+(?:\.\d+)?)\s*k\b".to_string(), 1_000.0),
        (r"(\d+(?:\.\d+)?)\s+mil\b".to_string(), 1_000.0),
        (format!(r"{}\s+(\d[\d,]*)\s+{}", over, audience), 1.0),
        (format!(r"(\d[\d,]*)\s*\+\s*{}", audience), 1.0),
        (format!(r"(\d[\d,]*)\s+{}", audience), 1.0),
    ]
    .into_iter()
    .map(|(pattern, multiplier)| (Regex::new(&pattern).expect("valid regex"), multiplier))
    .collect()
});

/// Result-count phrase patterns, in priority order
static COUNT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:need|want|get|find|give me|show me|list|dame|necesito|quiero|busca|búscame|buscame|muéstrame|muestrame|encuentra)\s+(\d[\d,]*)\b",
        r"\btop\s+(\d[\d,]*)\b",
        r"\b(\d[\d,]*)\s+(?:results?|resultados|profiles?|perfiles)\b",
        r"\b(?:first|primeros?|primeras?)\s+(\d[\d,]*)\b",
        r"\b(?:limit|l[ií]mite|max(?:imum)?|up to|hasta)\s*(?:of\s+|de\s+|:\s*)?(\d[\d,]*)\b",
        r"\b(\d[\d,]*)\s+(?:\w+\s+){0,3}?(?:streamers?|creators?|creadores|influencers?|channels?|canales|youtubers?|tiktokers?|vtubers?)\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

/// Every word that belongs to a platform, region or language vocabulary
static VOCABULARY_WORDS: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let mut words: HashSet<String> = HashSet::new();
    let terms = PLATFORM_TERMS
        .iter()
        .map(|(term, _, _)| *term)
        .chain(REGION_TERMS.iter().map(|(term, _)| *term))
        .chain(LANGUAGE_TERMS.iter().flat_map(|(alternatives, _)| alternatives.split('|')));

    for term in terms {
        for word in term.split_whitespace() {
            words.insert(word.trim_end_matches("s?").to_string());
            words.insert(word.replace("s?", "s"));
        }
    }
    words
});

/// Platforms named in the text
pub fn detect_platforms(text: &str) -> Vec<Platform> {
    let text = text.to_lowercase();
    let mut platforms = Vec::new();
    for (regex, platform) in PLATFORM_MATCHERS.iter() {
        if !platforms.contains(platform) && regex.is_match(&text) {
            platforms.push(*platform);
        }
    }
    platforms
}

/// Regions named in the text, each key matched on word boundaries
pub fn detect_regions(text: &str) -> Vec<Region> {
    let text = text.to_lowercase();
    let mut regions = Vec::new();
    for (regex, region) in REGION_MATCHERS.iter() {
        if !regions.contains(region) && regex.is_match(&text) {
            regions.push(*region);
        }
    }
    regions
}

/// Minimum follower count from the first matching threshold pattern
pub fn detect_min_followers(text: &str) -> Option<u64> {
    let text = text.to_lowercase();
    FOLLOWER_PATTERNS.iter().find_map(|(regex, multiplier)| {
        let captures = regex.captures(&text)?;
        let number: f64 = captures.get(1)?.as_str().replace(',', "").parse().ok()?;
        let followers = (number * multiplier).round();
        (followers >= 1.0).then_some(followers as u64)
    })
}

/// `Some(true)` for live-now requests, `Some(false)` for explicit offline
pub fn detect_live(text: &str) -> Option<bool> {
    let text = text.to_lowercase();
    if NOT_LIVE_RE.is_match(&text) {
        return Some(false);
    }
    let text = LIVE_CONTENT_PHRASES.replace_all(&text, " ");
    LIVE_RE.is_match(&text).then_some(true)
}

/// ISO 639-1 code of the first language named
pub fn detect_language(text: &str) -> Option<String> {
    let text = text.to_lowercase();
    LANGUAGE_MATCHERS
        .iter()
        .find(|(regex, _)| regex.is_match(&text))
        .map(|(_, code)| code.to_string())
}

pub fn detect_vtuber(text: &str) -> Option<bool> {
    VTUBER_RE.is_match(&text.to_lowercase()).then_some(true)
}

/// Camera usage; an explicit "no camera" wins over a positive mention
pub fn detect_camera(text: &str) -> Option<bool> {
    let text = text.to_lowercase();
    if NO_CAMERA_RE.is_match(&text) {
        Some(false)
    } else if CAMERA_RE.is_match(&text) {
        Some(true)
    } else {
        None
    }
}

/// Explicit number of results asked for
///
/// Patterns are tried in priority order; a capture outside
/// `1..=MAX_RESULT_LIMIT`, or one that is really an audience size
/// ("2 million", "500 followers"), is skipped and the search continues.
pub fn extract_result_count(text: &str) -> Option<u32> {
    let text = text.to_lowercase();
    for regex in COUNT_PATTERNS.iter() {
        for captures in regex.captures_iter(&text) {
            let Some(number) = captures.get(1) else {
                continue;
            };
            if COUNT_DISQUALIFIER_RE.is_match(&text[number.end()..]) {
                continue;
            }
            let Ok(count) = number.as_str().replace(',', "").parse::<u64>() else {
                continue;
            };
            if (1..=u64::from(MAX_RESULT_LIMIT)).contains(&count) {
                return u32::try_from(count).ok();
            }
        }
    }
    None
}

/// What is left of the text once filler and vocabulary words are removed,
/// kept together as one phrase
pub fn extract_tag_phrase(text: &str) -> Option<String> {
    let text = text.to_lowercase();
    let stop_words: HashSet<&str> = STOP_WORDS.iter().chain(FEATURE_WORDS.iter()).copied().collect();

    let remaining: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || ",;:!?()[]{}\"'¿¡/".contains(c))
        .map(|token| token.trim_matches(|c: char| c == '.' || c == '-'))
        .filter(|token| !token.is_empty())
        .filter(|token| !stop_words.contains(token))
        .filter(|token| !VOCABULARY_WORDS.contains(*token))
        .filter(|token| !NUMERIC_TOKEN_RE.is_match(token))
        .collect();

    if remaining.is_empty() {
        None
    } else {
        Some(remaining.join(" "))
    }
}

/// Translates free text into [`SearchCriteria`] without any external service
#[derive(Debug, Clone)]
pub struct QueryInterpreter {
    taxonomy: Arc<Taxonomy>,
}

impl QueryInterpreter {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Interpret one message on its own
    pub fn interpret(&self, text: &str) -> SearchCriteria {
        let criteria = SearchCriteria {
            platforms: detect_platforms(text),
            regions: detect_regions(text),
            tags: self.extract_tags(text),
            min_followers: detect_min_followers(text),
            is_live: detect_live(text),
            uses_camera: detect_camera(text),
            is_vtuber: detect_vtuber(text),
            language: detect_language(text),
            limit: extract_result_count(text),
            ..SearchCriteria::default()
        };

        tracing::debug!(
            platforms = criteria.platforms.len(),
            regions = criteria.regions.len(),
            tags = ?criteria.tags,
            min_followers = ?criteria.min_followers,
            limit = ?criteria.limit,
            "Interpreted query"
        );

        criteria
    }

    /// Interpret a follow-up message; fresh signals override the previous
    /// criteria field by field
    pub fn interpret_with_context(&self, text: &str, previous: Option<&SearchCriteria>) -> SearchCriteria {
        self.interpret(text).merged_over(previous)
    }

    /// Tag phrase, keyword variants and brand categories, lowercase and unique
    pub fn extract_tags(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut tags: Vec<String> = Vec::new();

        if let Some(phrase) = extract_tag_phrase(&lowered) {
            tags.push(phrase);
        }

        for entry in self.taxonomy.keywords.matches(&lowered) {
            for variant in &entry.categories {
                if !tags.contains(variant) {
                    tags.push(variant.clone());
                }
            }
        }

        self.taxonomy.brands.expand_tags(&lowered, &mut tags);

        tags
    }
}

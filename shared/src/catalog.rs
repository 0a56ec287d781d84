//! Localized option catalogs for the farm-problem form
//!
//! Each supported language carries the same options in the same order, so a
//! selection index means the same thing in every language.

use serde::Serialize;

/// Dropdown options shown on the chatbot form
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LanguageOptions {
    pub land_types: &'static [&'static str],
    pub seasons: &'static [&'static str],
    pub crops: &'static [&'static str],
}

const ENGLISH: LanguageOptions = LanguageOptions {
    land_types: &["Clay Soil", "Sandy Soil", "Loamy Soil", "Silt Soil", "Black Soil"],
    seasons: &["Kharif (Monsoon)", "Rabi (Winter)", "Zaid (Summer)"],
    crops: &[
        "Rice",
        "Wheat",
        "Cotton",
        "Sugarcane",
        "Pulses",
        "Vegetables",
        "Fruits",
        "Oil Seeds",
    ],
};

const HINDI: LanguageOptions = LanguageOptions {
    land_types: &[
        "मिट्टी की मिट्टी",
        "रेतीली मिट्टी",
        "दोमट मिट्टी",
        "गाद मिट्टी",
        "काली मिट्टी",
    ],
    seasons: &["खरीफ (मानसून)", "रबी (सर्दी)", "जायद (गर्मी)"],
    crops: &[
        "चावल",
        "गेहूं",
        "कपास",
        "गन्ना",
        "दालें",
        "सब्जियां",
        "फल",
        "तिलहन",
    ],
};

const TELUGU: LanguageOptions = LanguageOptions {
    land_types: &[
        "బంక మట్టి",
        "ఇసుక నేల",
        "లోమి నేల",
        "బురద నేల",
        "నల్ల నేల",
    ],
    seasons: &[
        "ఖరీఫ్ (వర్షాకాలం)",
        "రబీ (శీతాకాలం)",
        "జైద్ (వేసవి)",
    ],
    crops: &[
        "వరి",
        "గోధుమ",
        "పత్తి",
        "చెరకు",
        "పప్పు ధాన్యాలు",
        "కూరగాయలు",
        "పండ్లు",
        "నూనె గింజలు",
    ],
};

static CATALOG: [(&str, LanguageOptions); 3] =
    [("English", ENGLISH), ("Hindi", HINDI), ("Telugu", TELUGU)];

/// Look up the option catalog for a language name (exact match)
pub fn options_for(language: &str) -> Option<&'static LanguageOptions> {
    CATALOG
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, options)| options)
}

/// Names of all languages with a catalog
pub fn supported_languages() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

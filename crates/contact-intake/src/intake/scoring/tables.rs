//! Point tables for each classification field. Keys match the option values
//! the contact form posts; anything else earns nothing.

pub(crate) const DEFAULT_LOCAL_AREAS: &[&str] = &[
    "livermore",
    "pleasanton",
    "dublin",
    "san ramon",
    "danville",
    "tracy",
    "manteca",
];

pub(crate) const LOCAL_BONUS: u16 = 20;

pub(crate) fn project_type_points(value: &str) -> u16 {
    match value {
        "emergency" => 100,
        "flooding" => 90,
        "drainage" => 85,
        "retaining-wall" => 80,
        "concrete-masonry" => 75,
        "landscaping" => 70,
        "fencing" => 65,
        "decks" => 60,
        "excavation" => 55,
        "remediation" => 50,
        "stormwater" => 45,
        "other" => 30,
        _ => 0,
    }
}

pub(crate) fn timeline_points(value: &str) -> u16 {
    match value {
        "immediate" => 100,
        "1-3-months" => 80,
        "3-6-months" => 60,
        "6-12-months" => 40,
        "flexible" => 20,
        _ => 0,
    }
}

pub(crate) fn budget_points(value: &str) -> u16 {
    match value {
        "over-100k" => 100,
        "50k-100k" => 90,
        "15k-50k" => 80,
        "5k-15k" => 70,
        "under-5k" => 60,
        "to-be-determined" => 50,
        _ => 0,
    }
}

pub(crate) fn property_type_points(value: &str) -> u16 {
    match value {
        "commercial" => 100,
        "industrial" => 90,
        "municipal" => 85,
        "residential" => 70,
        _ => 0,
    }
}

pub(crate) fn urgency_points(value: &str) -> u16 {
    match value {
        "emergency" => 100,
        "urgent" => 80,
        "normal" => 60,
        "low" => 40,
        _ => 0,
    }
}

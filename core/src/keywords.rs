//! Static keyword tables for the rule-based classifiers.
//!
//! RULE: Tables are data, not code. Iteration order is declaration order,
//! and every "first maximum wins" tie-break depends on it.

use crate::types::{Category, Priority};

// ── Classifier tables ────────────────────────────────────────────────────────

/// Category keyword lists scanned by the classifier, in tie-break order.
/// `Others` has no keywords; it is only reachable through the fallback.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Road, &[
        "road", "pothole", "street", "highway", "footpath", "pavement",
        "traffic", "signal", "zebra crossing", "divider", "bridge",
        "flyover", "underpass", "crater", "broken road", "tar", "asphalt",
    ]),
    (Category::Water, &[
        "water", "pipe", "leakage", "supply", "tap", "drain", "sewage",
        "pipeline", "bore", "borewell", "tank", "drinking water",
        "contaminated", "dirty water", "water shortage", "no water",
    ]),
    (Category::Electricity, &[
        "electricity", "power", "light", "pole", "wire", "transformer",
        "outage", "blackout", "voltage", "meter", "bill", "street light",
        "electric", "current", "shock", "cable", "power cut",
    ]),
    (Category::Sanitation, &[
        "garbage", "waste", "trash", "dustbin", "cleaning", "sweeper",
        "sanitation", "toilet", "public toilet", "urinal", "smell",
        "foul", "mosquito", "breeding", "dump", "littering", "filth",
    ]),
    (Category::HealthSafety, &[
        "hospital", "health", "clinic", "ambulance", "doctor", "medicine",
        "danger", "unsafe", "hazard", "accident", "injury", "emergency",
        "fire", "safety", "elderly", "child", "disabled", "risk",
    ]),
];

/// Priority tiers in precedence order: the first tier with a match wins,
/// except `Low`, whose matches are recorded but never change the default.
pub const PRIORITY_KEYWORDS: &[(Priority, &[&str])] = &[
    (Priority::High, &[
        "accident", "danger", "emergency", "hospital", "elderly", "child",
        "death", "injury", "fire", "collapse", "urgent", "critical",
        "life-threatening", "severe", "immediate", "hazard", "unsafe",
    ]),
    (Priority::Medium, &[
        "delay", "pending", "utility", "inconvenience", "problem",
        "issue", "complaint", "days", "weeks", "waiting", "supply",
    ]),
    (Priority::Low, &[
        "request", "suggestion", "improvement", "general", "minor",
        "feedback", "information", "query", "clarification",
    ]),
];

// ── Departments ──────────────────────────────────────────────────────────────

pub const DEPT_PUBLIC_WORKS: &str = "Public Works Department (PWD)";
pub const DEPT_WATER: &str = "Water Supply & Sewerage Board";
pub const DEPT_ELECTRICITY: &str = "Electricity Board";
pub const DEPT_SANITATION: &str = "Municipal Corporation - Sanitation";
pub const DEPT_HEALTH_SAFETY: &str = "Health & Safety Department";
pub const DEPT_TRANSPORT: &str = "Transport Department";
pub const DEPT_GENERAL_ADMIN: &str = "General Administration";

/// Static 1:1 routing from a final category to its primary department.
/// Also the fallback when the department scorer finds no signal.
pub fn default_department(category: Category) -> &'static str {
    match category {
        Category::Road         => DEPT_PUBLIC_WORKS,
        Category::Water        => DEPT_WATER,
        Category::Electricity  => DEPT_ELECTRICITY,
        Category::Sanitation   => DEPT_SANITATION,
        Category::HealthSafety => DEPT_HEALTH_SAFETY,
        Category::Others       => DEPT_GENERAL_ADMIN,
    }
}

// ── Department scorer tables ─────────────────────────────────────────────────

pub struct DepartmentProfile {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    /// Grievance categories this department normally handles.
    pub categories: &'static [Category],
}

/// The seven departments in definition order (tie-break order).
/// Matches count per list entry, so a repeated keyword weighs double.
pub const DEPARTMENT_PROFILES: &[DepartmentProfile] = &[
    DepartmentProfile {
        name: DEPT_PUBLIC_WORKS,
        keywords: &[
            "road", "pothole", "street", "highway", "footpath", "pavement",
            "traffic", "signal", "zebra crossing", "divider", "bridge",
            "flyover", "underpass", "crater", "broken road", "tar", "asphalt",
            "construction", "building", "infrastructure", "footpath", "sidewalk",
            "parking", "road repair", "paver", "cement", "concrete",
        ],
        categories: &[Category::Road],
    },
    DepartmentProfile {
        name: DEPT_WATER,
        keywords: &[
            "water", "pipe", "leakage", "supply", "tap", "drain", "sewage",
            "pipeline", "bore", "borewell", "tank", "drinking water",
            "contaminated", "dirty water", "water shortage", "no water",
            "overflow", "flooding", "drainage", "sewer", "water quality",
            "water pressure", "water bill", "water connection", "plumbing",
        ],
        categories: &[Category::Water],
    },
    DepartmentProfile {
        name: DEPT_ELECTRICITY,
        keywords: &[
            "electricity", "power", "light", "pole", "wire", "transformer",
            "outage", "blackout", "voltage", "meter", "bill", "street light",
            "electric", "current", "shock", "cable", "power cut", "fuse",
            "circuit", "electrical", "power supply", "load shedding",
            "solar", "energy", "lamp post", "bulb", "led light",
        ],
        categories: &[Category::Electricity],
    },
    DepartmentProfile {
        name: DEPT_SANITATION,
        keywords: &[
            "garbage", "waste", "trash", "dustbin", "cleaning", "sweeper",
            "sanitation", "toilet", "public toilet", "urinal", "smell",
            "foul", "mosquito", "breeding", "dump", "littering", "filth",
            "hygiene", "cleanliness", "garbage collection", "waste management",
            "recycling", "compost", "debris", "litter", "solid waste",
        ],
        categories: &[Category::Sanitation],
    },
    DepartmentProfile {
        name: DEPT_HEALTH_SAFETY,
        keywords: &[
            "hospital", "health", "clinic", "ambulance", "doctor", "medicine",
            "danger", "unsafe", "hazard", "accident", "injury", "emergency",
            "fire", "safety", "elderly", "child", "disabled", "risk",
            "disease", "epidemic", "vaccination", "first aid", "medical",
            "public health", "food safety", "pollution", "air quality",
        ],
        categories: &[Category::HealthSafety],
    },
    DepartmentProfile {
        name: DEPT_TRANSPORT,
        keywords: &[
            "bus", "transport", "traffic", "vehicle", "auto", "taxi",
            "public transport", "metro", "train", "station", "stop",
            "route", "schedule", "fare", "ticket", "commute", "parking",
            "traffic jam", "traffic police", "license", "permit",
        ],
        categories: &[Category::Road, Category::Others],
    },
    DepartmentProfile {
        name: DEPT_GENERAL_ADMIN,
        keywords: &[
            "certificate", "license", "permit", "document", "office",
            "registration", "application", "form", "complaint", "request",
            "general", "other", "miscellaneous", "enquiry", "information",
        ],
        categories: &[Category::Others],
    },
];

/// Narrower per-category lists used by the categorizer's refinement step.
pub const REFINEMENT_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Road, &[
        "road", "pothole", "street", "highway", "footpath", "bridge",
        "flyover", "traffic light", "signal", "pavement",
    ]),
    (Category::Water, &[
        "water", "pipe", "leakage", "tap", "drain", "sewage",
        "borewell", "drinking water", "water supply",
    ]),
    (Category::Electricity, &[
        "electricity", "power", "light", "pole", "transformer",
        "power cut", "street light", "meter",
    ]),
    (Category::Sanitation, &[
        "garbage", "waste", "dustbin", "cleaning", "toilet",
        "sanitation", "mosquito", "filth", "smell",
    ]),
    (Category::HealthSafety, &[
        "hospital", "health", "clinic", "danger", "unsafe",
        "accident", "emergency", "fire", "safety",
    ]),
];

/// Keywords from `list` that occur (case-insensitive substring) in `text_lower`.
/// `text_lower` must already be lower-cased.
pub fn matches_in<'a>(text_lower: &str, list: &[&'a str]) -> Vec<&'a str> {
    list.iter().copied().filter(|kw| text_lower.contains(kw)).collect()
}

/// Department names in definition order.
pub fn all_departments() -> Vec<&'static str> {
    DEPARTMENT_PROFILES.iter().map(|d| d.name).collect()
}

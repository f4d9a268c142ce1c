//! Named report sections and their heading phrases.
//!
//! Each section has one canonical heading phrase and one or more alternate
//! spellings. The table is static and ordered; order matters when a heading
//! could match more than one section and for the unheaded-content fallback,
//! which always targets [`Section::Summary`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named logical region of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Content analysis.
    Summary,
    /// Study roadmap.
    Schedule,
    /// Recall assessment.
    Quiz,
    /// External resources.
    Resources,
    /// Performance forecasting.
    Evaluation,
}

/// Heading phrases for one section.
#[derive(Debug, Clone, Copy)]
pub struct SectionHeadings {
    /// The section these phrases bind to.
    pub section: Section,
    /// Current heading phrase.
    pub canonical: &'static str,
    /// Legacy or alternate heading phrases.
    pub alternates: &'static [&'static str],
}

impl SectionHeadings {
    /// Iterates the canonical phrase followed by the alternates.
    pub fn phrases(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.canonical).chain(self.alternates.iter().copied())
    }
}

/// Heading table in section order.
pub const SECTION_HEADINGS: [SectionHeadings; 5] = [
    SectionHeadings {
        section: Section::Summary,
        canonical: "High-Yield Content Analysis",
        alternates: &["Content Analysis"],
    },
    SectionHeadings {
        section: Section::Schedule,
        canonical: "Optimized Roadmap",
        alternates: &["Study Roadmap"],
    },
    SectionHeadings {
        section: Section::Quiz,
        canonical: "Active Recall Assessment",
        alternates: &["Practice Questions"],
    },
    SectionHeadings {
        section: Section::Resources,
        canonical: "External Resource Vault",
        alternates: &["Recommended Resources"],
    },
    SectionHeadings {
        section: Section::Evaluation,
        canonical: "Performance Forecasting",
        alternates: &["Performance Analysis"],
    },
];

impl Section {
    /// All sections in table order.
    pub const ALL: [Self; 5] = [
        Self::Summary,
        Self::Schedule,
        Self::Quiz,
        Self::Resources,
        Self::Evaluation,
    ];

    /// Stable slug used for output region names and JSON keys.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Schedule => "schedule",
            Self::Quiz => "quiz",
            Self::Resources => "resources",
            Self::Evaluation => "evaluation",
        }
    }

    /// Parses a section from its slug.
    #[must_use]
    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.slug() == s)
    }

    /// Returns the heading phrases for this section.
    #[must_use]
    pub const fn headings(self) -> &'static SectionHeadings {
        &SECTION_HEADINGS[self.index()]
    }

    /// Position in [`Section::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

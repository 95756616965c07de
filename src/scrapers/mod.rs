//! Publisher-specific extraction strategies.
//!
//! Each submodule knows one publisher's markup and exposes
//! `extract(fetcher, request) -> Result<Option<PrintableArticle>, ExtractError>`.
//! [`Publisher`] names the strategies and [`Registry`] maps an origin
//! (`scheme://host/`) to one of them.
//!
//! # Supported Sources
//!
//! | Origin | Publisher | Page source |
//! |--------|-----------|-------------|
//! | theguardian.com, nytimes.com, globaltimes.cn | [`Publisher::Mercury`] | Mercury AMP proxy |
//! | wsj.com | [`Publisher::Wsj`] | `/amp/` edition, crawler profile |
//! | thehindu.com | [`Publisher::Hindu`] | direct |
//! | washingtonpost.com | [`Publisher::WashingtonPost`] | AMP discovery, else Outline |
//! | indianexpress.com | [`Publisher::IndianExpress`] | direct |
//! | livemint.com | [`Publisher::Livemint`] | AMP discovery |
//! | taipeitimes.com | [`Publisher::TaipeiTimes`] | direct, crawler profile |
//! | downtoearth.org.in | [`Publisher::DownToEarth`] | AMP discovery, else Outline |
//! | hongkongfp.com | [`Publisher::Hkfp`] | direct |
//! | epw.in | [`Publisher::Epw`] | direct, decoded URL on 404 |
//! | economist.com | [`Publisher::Economist`] | AMP discovery |
//! | sapiens.org | [`Publisher::Sapiens`] | browser |
//! | perspectivesinanthropology.com | [`Publisher::PerspectivesInAnthropology`] | AMP discovery, else Mercury |
//! | insightsonindia.com | [`Publisher::Insights`] | latest daily summary |
//! | thepeoplehistory.com, indianage.com | [`Publisher::History`] | direct |
//! | dawn.com | [`Publisher::Dawn`] | AMP discovery |
//! | medium.com | [`Publisher::Outline`] | Outline reader |

use std::collections::HashMap;
use std::fmt;

use crate::error::ExtractError;
use crate::fetch::Fetch;
use crate::models::{ArticleRequest, PrintableArticle};

pub mod common;
pub mod dawn;
pub mod down_to_earth;
pub mod economist;
pub mod epw;
pub mod hindu;
pub mod history;
pub mod hkfp;
pub mod indian_express;
pub mod insights;
pub mod livemint;
pub mod mercury;
pub mod outline;
pub mod perspectives;
pub mod sapiens;
pub mod taipei_times;
pub mod washington_post;
pub mod wsj;

/// A named extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Publisher {
    Mercury,
    Wsj,
    Hindu,
    WashingtonPost,
    IndianExpress,
    Livemint,
    TaipeiTimes,
    DownToEarth,
    Hkfp,
    Epw,
    Economist,
    Sapiens,
    PerspectivesInAnthropology,
    Insights,
    History,
    Dawn,
    Outline,
}

impl Publisher {
    pub fn name(self) -> &'static str {
        match self {
            Publisher::Mercury => "mercury",
            Publisher::Wsj => "wsj",
            Publisher::Hindu => "hindu",
            Publisher::WashingtonPost => "washington_post",
            Publisher::IndianExpress => "indian_express",
            Publisher::Livemint => "livemint",
            Publisher::TaipeiTimes => "taipei_times",
            Publisher::DownToEarth => "down_to_earth",
            Publisher::Hkfp => "hkfp",
            Publisher::Epw => "epw",
            Publisher::Economist => "economist",
            Publisher::Sapiens => "sapiens",
            Publisher::PerspectivesInAnthropology => "perspectives",
            Publisher::Insights => "insights",
            Publisher::History => "history",
            Publisher::Dawn => "dawn",
            Publisher::Outline => "outline",
        }
    }

    /// Run this publisher's strategy for `request`.
    pub async fn extract<F: Fetch>(
        self,
        fetcher: &F,
        request: &ArticleRequest,
    ) -> Result<Option<PrintableArticle>, ExtractError> {
        match self {
            Publisher::Mercury => mercury::extract(fetcher, request).await,
            Publisher::Wsj => wsj::extract(fetcher, request).await,
            Publisher::Hindu => hindu::extract(fetcher, request).await,
            Publisher::WashingtonPost => washington_post::extract(fetcher, request).await,
            Publisher::IndianExpress => indian_express::extract(fetcher, request).await,
            Publisher::Livemint => livemint::extract(fetcher, request).await,
            Publisher::TaipeiTimes => taipei_times::extract(fetcher, request).await,
            Publisher::DownToEarth => down_to_earth::extract(fetcher, request).await,
            Publisher::Hkfp => hkfp::extract(fetcher, request).await,
            Publisher::Epw => epw::extract(fetcher, request).await,
            Publisher::Economist => economist::extract(fetcher, request).await,
            Publisher::Sapiens => sapiens::extract(fetcher, request).await,
            Publisher::PerspectivesInAnthropology => perspectives::extract(fetcher, request).await,
            Publisher::Insights => insights::extract(fetcher, request).await,
            Publisher::History => history::extract(fetcher, request).await,
            Publisher::Dawn => dawn::extract(fetcher, request).await,
            Publisher::Outline => outline::extract(fetcher, request).await,
        }
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const STANDARD: &[(&str, Publisher)] = &[
    ("https://www.theguardian.com/", Publisher::Mercury),
    ("https://www.wsj.com/", Publisher::Wsj),
    ("https://www.thehindu.com/", Publisher::Hindu),
    ("https://www.washingtonpost.com/", Publisher::WashingtonPost),
    ("https://indianexpress.com/", Publisher::IndianExpress),
    ("https://www.livemint.com/", Publisher::Livemint),
    ("https://www.globaltimes.cn/", Publisher::Mercury),
    ("https://www.nytimes.com/", Publisher::Mercury),
    ("https://www.taipeitimes.com/", Publisher::TaipeiTimes),
    ("https://www.downtoearth.org.in/", Publisher::DownToEarth),
    ("https://hongkongfp.com/", Publisher::Hkfp),
    ("https://www.epw.in/", Publisher::Epw),
    ("https://www.economist.com/", Publisher::Economist),
    ("https://www.sapiens.org/", Publisher::Sapiens),
    ("https://perspectivesinanthropology.com/", Publisher::PerspectivesInAnthropology),
    ("https://www.insightsonindia.com/", Publisher::Insights),
    ("http://www.thepeoplehistory.com/", Publisher::History),
    ("https://www.indianage.com/", Publisher::History),
    ("https://www.dawn.com/", Publisher::Dawn),
    ("https://medium.com/", Publisher::Outline),
];

/// Origin to strategy mapping. Lookups are exact string matches.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    by_origin: HashMap<String, Publisher>,
}

impl Registry {
    /// Every supported publisher.
    pub fn standard() -> Self {
        let mut registry = Self::default();
        for &(origin, publisher) in STANDARD {
            registry.insert(origin, publisher);
        }
        registry
    }

    pub fn insert(&mut self, origin: &str, publisher: Publisher) {
        self.by_origin.insert(origin.to_string(), publisher);
    }

    pub fn lookup(&self, origin: &str) -> Option<Publisher> {
        self.by_origin.get(origin).copied()
    }

    pub fn len(&self) -> usize {
        self.by_origin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_origin.is_empty()
    }
}

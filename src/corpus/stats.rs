use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ActRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct YearsCoverage {
    pub earliest: Option<i32>,
    pub latest: Option<i32>,
}

/// Summary figures for the loaded corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CorpusStats {
    pub total_acts: usize,
    pub total_chunks: usize,
    pub active_acts: usize,
    pub repealed_acts: usize,
    pub years_coverage: YearsCoverage,
    /// Keyed `"1970s"`, counting acts with numeric years only.
    pub acts_by_decade: BTreeMap<String, usize>,
    pub language_distribution: BTreeMap<String, usize>,
    pub average_sections: f64,
}

/// Short description of an act for listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActSummary {
    pub act_id: String,
    pub act_title: String,
    pub act_year: String,
    pub is_repealed: bool,
    pub total_sections: u32,
    pub url: String,
}

impl From<&ActRecord> for ActSummary {
    fn from(act: &ActRecord) -> Self {
        Self {
            act_id: act.act_id.clone(),
            act_title: act.act_title.clone(),
            act_year: act.act_year.clone(),
            is_repealed: act.is_repealed,
            total_sections: act.total_sections,
            url: act.url.clone(),
        }
    }
}

pub fn act_statistics(acts: &[ActRecord], total_chunks: usize) -> CorpusStats {
    let repealed_acts = acts.iter().filter(|a| a.is_repealed).count();

    let years: Vec<i32> = acts.iter().filter_map(ActRecord::year).collect();
    let years_coverage = YearsCoverage {
        earliest: years.iter().copied().min(),
        latest: years.iter().copied().max(),
    };

    let mut acts_by_decade = BTreeMap::new();
    for year in &years {
        let decade = (year / 10) * 10;
        *acts_by_decade.entry(format!("{}s", decade)).or_insert(0) += 1;
    }

    let mut language_distribution = BTreeMap::new();
    for act in acts {
        *language_distribution
            .entry(act.language_detected.clone())
            .or_insert(0) += 1;
    }

    let average_sections = if acts.is_empty() {
        0.0
    } else {
        acts.iter().map(|a| a.total_sections as f64).sum::<f64>() / acts.len() as f64
    };

    CorpusStats {
        total_acts: acts.len(),
        total_chunks,
        active_acts: acts.len() - repealed_acts,
        repealed_acts,
        years_coverage,
        acts_by_decade,
        language_distribution,
        average_sections,
    }
}

/// The `n` most recent acts by numeric year, newest first.
pub fn recent_acts(acts: &[ActRecord], n: usize) -> Vec<&ActRecord> {
    let mut dated: Vec<(i32, &ActRecord)> =
        acts.iter().filter_map(|a| a.year().map(|y| (y, a))).collect();
    // Stable sort keeps corpus order within a year
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.into_iter().take(n).map(|(_, a)| a).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn act(id: &str, year: &str, repealed: bool, lang: &str, sections: u32) -> ActRecord {
        ActRecord {
            act_id: id.to_string(),
            act_title: format!("Act {id}"),
            act_year: year.to_string(),
            is_repealed: repealed,
            language_detected: lang.to_string(),
            total_sections: sections,
            ..Default::default()
        }
    }

    fn corpus() -> Vec<ActRecord> {
        vec![
            act("1", "1860", false, "english", 511),
            act("2", "1972", false, "bengali", 153),
            act("3", "1975", true, "english", 10),
            act("4", "unknown", false, "english", 0),
        ]
    }

    #[test]
    fn test_statistics() {
        let stats = act_statistics(&corpus(), 99);
        assert_eq!(stats.total_acts, 4);
        assert_eq!(stats.total_chunks, 99);
        assert_eq!(stats.active_acts, 3);
        assert_eq!(stats.repealed_acts, 1);
        assert_eq!(stats.years_coverage.earliest, Some(1860));
        assert_eq!(stats.years_coverage.latest, Some(1975));
        assert_eq!(stats.acts_by_decade.get("1970s"), Some(&2));
        assert_eq!(stats.acts_by_decade.get("1860s"), Some(&1));
        assert_eq!(stats.acts_by_decade.len(), 2);
        assert_eq!(stats.language_distribution.get("english"), Some(&3));
        assert!((stats.average_sections - 168.5).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = act_statistics(&[], 0);
        assert_eq!(stats.total_acts, 0);
        assert_eq!(stats.years_coverage, YearsCoverage::default());
        assert_eq!(stats.average_sections, 0.0);
    }

    #[test]
    fn test_recent_acts() {
        let acts = corpus();
        let recent = recent_acts(&acts, 2);
        let ids: Vec<&str> = recent.iter().map(|a| a.act_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
        assert_eq!(recent_acts(&acts, 10).len(), 3);
    }

    #[test]
    fn test_bengali_numeral_years_are_counted() {
        let acts = vec![
            act("1", "1860", false, "english", 1),
            act("2", "১৯৭২", false, "bengali", 1),
        ];
        let stats = act_statistics(&acts, 0);
        assert_eq!(stats.years_coverage.latest, Some(1972));
        assert_eq!(stats.acts_by_decade.get("1970s"), Some(&1));

        let recent = recent_acts(&acts, 1);
        assert_eq!(recent[0].act_id, "2");
    }
}

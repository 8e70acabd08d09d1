//! SQL template module
//!
//! A small closed set of query templates over one hosted table. Interpolated
//! values come exclusively from the enums below; request strings never reach
//! the SQL text. The one exception is the ad-hoc `/api/query` endpoint, which
//! forwards its body unmodified by explicit contract; treat that endpoint as
//! trusted-operator-only.

/// The analytical table every dashboard query reads
pub const TABLE: &str = "silver_sos_2024_09_voters_llama2_3_4";

/// Cohort filter: the demographic subset the dashboard reports on
pub const COHORT_WHERE: &str =
    "(lower(llama_names) LIKE 'muslim' OR lower(llama_names) LIKE 'revert')";

/// Election periods the dashboard understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionPeriod {
    Aug2024,
    Nov2024,
}

impl ElectionPeriod {
    /// Strict parse of a request label; `None` for anything unrecognized
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Nov 2024" => Some(Self::Nov2024),
            "Aug 2024" => Some(Self::Aug2024),
            _ => None,
        }
    }

    /// Lenient parse: unknown labels fall into the Aug 2024 branch
    ///
    /// The top-jurisdictions endpoint has always defaulted rather than
    /// rejected; see DESIGN.md before tightening this.
    pub fn parse_or_default(label: &str) -> Self {
        Self::parse(label).unwrap_or(Self::Aug2024)
    }

    /// Turnout condition: the predicate defining "counted as voted"
    pub const fn counted_predicate(self) -> &'static str {
        match self {
            Self::Nov2024 => "lower(ballot_status) = 'accepted'",
            Self::Aug2024 => "upper(Aug_2024_Status) = 'VOTED'",
        }
    }
}

/// Jurisdiction dimensions for the map breakdown
///
/// Only legislative districts are wired up today; every unrecognized request
/// value falls back to them, so the free-text field never reaches the SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jurisdiction {
    LegislativeDistricts,
}

impl Jurisdiction {
    #[allow(clippy::match_same_arms)]
    pub fn parse(label: Option<&str>) -> Self {
        match label {
            Some("Legislative Districts") => Self::LegislativeDistricts,
            // Default to legislative districts for now
            _ => Self::LegislativeDistricts,
        }
    }

    pub const fn column(self) -> &'static str {
        match self {
            Self::LegislativeDistricts => "legislativedistrict",
        }
    }
}

/// Grouping dimensions for the top-jurisdictions ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDimension {
    County,
    Congressional,
    Legislative,
    Cities,
}

impl RankDimension {
    /// Issue order matters: the four queries run strictly sequentially
    pub const ALL: [Self; 4] = [
        Self::County,
        Self::Congressional,
        Self::Legislative,
        Self::Cities,
    ];

    pub const fn column(self) -> &'static str {
        match self {
            Self::County => "countycode",
            Self::Congressional => "congressionaldistrict",
            Self::Legislative => "legislativedistrict",
            Self::Cities => "regcity",
        }
    }

    /// Top-1 for districts, top-2 for cities
    pub const fn limit(self) -> usize {
        match self {
            Self::Cities => 2,
            _ => 1,
        }
    }
}

/// KPI-card aggregate: totals, turnout, new registrations, district coverage
pub fn metrics_summary(period: ElectionPeriod) -> String {
    format!(
        "SELECT \
            count() AS total_voters, \
            round(100 * countIf({cond}) / count(), 0) AS turnout_pct, \
            countIf(toYear(registrationdate) = 2024) AS new_regs, \
            uniqExact(toInt32OrNull(legislativedistrict)) AS active_legis, \
            ( \
                SELECT uniqExact(toInt32OrNull(legislativedistrict)) \
                FROM {TABLE} \
                WHERE legislativedistrict != '' \
            ) AS total_legis \
         FROM {TABLE} \
         WHERE {COHORT_WHERE} \
           AND legislativedistrict != '' \
         FORMAT JSON",
        cond = period.counted_predicate(),
    )
}

/// One row per jurisdiction value for the map view
pub fn jurisdiction_breakdown(period: ElectionPeriod, jurisdiction: Jurisdiction) -> String {
    format!(
        "SELECT \
            {col} AS jurisdiction_name, \
            count() AS voter_count, \
            round(100 * countIf({cond}) / count(), 0) AS turnout_pct \
         FROM {TABLE} \
         WHERE {COHORT_WHERE} \
           AND {col} != '' \
         GROUP BY {col} \
         ORDER BY voter_count DESC \
         FORMAT JSON",
        col = jurisdiction.column(),
        cond = period.counted_predicate(),
    )
}

/// Ranked grouping for one top-jurisdictions dimension
pub fn top_ranked(period: ElectionPeriod, dimension: RankDimension) -> String {
    format!(
        "SELECT {col} AS name, \
            count() AS count, \
            round(100 * countIf({cond}) / count(), 1) AS turnout \
         FROM {TABLE} \
         WHERE {COHORT_WHERE} \
         GROUP BY {col} \
         ORDER BY count DESC \
         LIMIT {limit} \
         FORMAT JSON",
        col = dimension.column(),
        cond = period.counted_predicate(),
        limit = dimension.limit(),
    )
}

/// Two-branch union for the turnout time series, ordered chronologically
///
/// The Aug branch compares `lower(...)` to `'voted'` while every other Aug
/// query uppercases; that asymmetry is in the production queries and is kept.
pub fn turnout_series() -> String {
    format!(
        "SELECT * FROM ( \
            SELECT 'Aug 2024' AS label, \
                   round(100 * countIf(lower(Aug_2024_Status) = 'voted') / count(), 0) AS pct, \
                   202408 AS sort_key \
            FROM {TABLE} \
            WHERE {COHORT_WHERE} \
            UNION ALL \
            SELECT 'Nov 2024' AS label, \
                   round(100 * countIf(lower(ballot_status) = 'accepted') / count(), 0) AS pct, \
                   202411 AS sort_key \
            FROM {TABLE} \
            WHERE {COHORT_WHERE} \
         ) \
         ORDER BY sort_key \
         FORMAT JSON"
    )
}

/// Connectivity probe issued by /api/test-clickhouse
pub const fn connectivity_probe() -> &'static str {
    "SELECT version() as version, now() as current_time"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_only_the_two_labels() {
        assert_eq!(ElectionPeriod::parse("Nov 2024"), Some(ElectionPeriod::Nov2024));
        assert_eq!(ElectionPeriod::parse("Aug 2024"), Some(ElectionPeriod::Aug2024));
        assert_eq!(ElectionPeriod::parse("Nov 2020"), None);
        assert_eq!(ElectionPeriod::parse(""), None);
    }

    #[test]
    fn parse_or_default_falls_back_to_aug() {
        assert_eq!(
            ElectionPeriod::parse_or_default("whatever"),
            ElectionPeriod::Aug2024
        );
        assert_eq!(
            ElectionPeriod::parse_or_default("Nov 2024"),
            ElectionPeriod::Nov2024
        );
    }

    #[test]
    fn counted_predicate_varies_by_period() {
        assert_eq!(
            ElectionPeriod::Nov2024.counted_predicate(),
            "lower(ballot_status) = 'accepted'"
        );
        assert_eq!(
            ElectionPeriod::Aug2024.counted_predicate(),
            "upper(Aug_2024_Status) = 'VOTED'"
        );
    }

    #[test]
    fn jurisdiction_always_falls_back_to_legislative() {
        assert_eq!(
            Jurisdiction::parse(Some("Legislative Districts")),
            Jurisdiction::LegislativeDistricts
        );
        assert_eq!(
            Jurisdiction::parse(Some("Counties")),
            Jurisdiction::LegislativeDistricts
        );
        assert_eq!(Jurisdiction::parse(None), Jurisdiction::LegislativeDistricts);
    }

    #[test]
    fn metrics_summary_uses_the_period_predicate() {
        let nov = metrics_summary(ElectionPeriod::Nov2024);
        assert!(nov.contains("lower(ballot_status) = 'accepted'"));
        assert!(nov.contains(TABLE));
        assert!(nov.contains("FORMAT JSON"));

        let aug = metrics_summary(ElectionPeriod::Aug2024);
        assert!(aug.contains("upper(Aug_2024_Status) = 'VOTED'"));
    }

    #[test]
    fn breakdown_groups_by_the_jurisdiction_column() {
        let sql = jurisdiction_breakdown(
            ElectionPeriod::Nov2024,
            Jurisdiction::LegislativeDistricts,
        );
        assert!(sql.contains("GROUP BY legislativedistrict"));
        assert!(sql.contains("jurisdiction_name"));
        assert!(sql.contains("ORDER BY voter_count DESC"));
    }

    #[test]
    fn ranked_templates_cover_all_dimensions() {
        for dim in RankDimension::ALL {
            let sql = top_ranked(ElectionPeriod::Aug2024, dim);
            assert!(sql.contains(dim.column()));
            assert!(sql.contains(&format!("LIMIT {}", dim.limit())));
            assert!(sql.contains(COHORT_WHERE));
        }
        assert_eq!(RankDimension::Cities.limit(), 2);
        assert_eq!(RankDimension::County.limit(), 1);
    }

    #[test]
    fn turnout_series_orders_chronologically() {
        let sql = turnout_series();
        assert!(sql.contains("202408"));
        assert!(sql.contains("202411"));
        assert!(sql.contains("ORDER BY sort_key"));
        // Preserved casing asymmetry of the Aug branch
        assert!(sql.contains("lower(Aug_2024_Status) = 'voted'"));
    }
}

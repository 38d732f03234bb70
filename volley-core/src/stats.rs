use std::{cmp::Ordering, collections::BTreeMap, iter::Sum, ops::AddAssign};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::TeamId;

pub const TREND_THRESHOLD: f64 = 0.05;
pub const POINTS_PER_WIN: u64 = 3;
pub const POINTS_PER_LOSS: u64 = 1;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn calculate_percentage(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    round2(value / total * 100.0)
}

pub fn calculate_average(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    round2(total / count as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStatLine {
    pub matches_played: u32,
    pub serves_attempted: u32,
    pub successful_serves: u32,
    pub aces: u32,
    pub attacks_attempted: u32,
    pub successful_attacks: u32,
    pub blocks_attempted: u32,
    pub successful_blocks: u32,
    pub receptions_attempted: u32,
    pub successful_receptions: u32,
    pub digs: u32,
}

/// Counters saturate at `u32::MAX`.
impl AddAssign<&PlayerStatLine> for PlayerStatLine {
    fn add_assign(&mut self, other: &PlayerStatLine) {
        self.matches_played = self.matches_played.saturating_add(other.matches_played);
        self.serves_attempted = self.serves_attempted.saturating_add(other.serves_attempted);
        self.successful_serves = self.successful_serves.saturating_add(other.successful_serves);
        self.aces = self.aces.saturating_add(other.aces);
        self.attacks_attempted = self.attacks_attempted.saturating_add(other.attacks_attempted);
        self.successful_attacks = self.successful_attacks.saturating_add(other.successful_attacks);
        self.blocks_attempted = self.blocks_attempted.saturating_add(other.blocks_attempted);
        self.successful_blocks = self.successful_blocks.saturating_add(other.successful_blocks);
        self.receptions_attempted = self
            .receptions_attempted
            .saturating_add(other.receptions_attempted);
        self.successful_receptions = self
            .successful_receptions
            .saturating_add(other.successful_receptions);
        self.digs = self.digs.saturating_add(other.digs);
    }
}

impl<'a> Sum<&'a PlayerStatLine> for PlayerStatLine {
    fn sum<I: Iterator<Item = &'a PlayerStatLine>>(iter: I) -> Self {
        let mut total = PlayerStatLine::default();
        for line in iter {
            total += line;
        }
        total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPerformance {
    pub serve_percentage: f64,
    pub attack_percentage: f64,
    pub block_percentage: f64,
    pub reception_percentage: f64,
    pub aces_per_match: f64,
    pub digs_per_match: f64,
    pub points_per_match: f64,
    pub total_points: u64,
}

pub fn player_performance(line: &PlayerStatLine) -> PlayerPerformance {
    let total_points = u64::from(line.successful_attacks)
        + u64::from(line.aces)
        + u64::from(line.successful_blocks);
    let matches = line.matches_played as usize;
    PlayerPerformance {
        serve_percentage: calculate_percentage(
            line.successful_serves as f64,
            line.serves_attempted as f64,
        ),
        attack_percentage: calculate_percentage(
            line.successful_attacks as f64,
            line.attacks_attempted as f64,
        ),
        block_percentage: calculate_percentage(
            line.successful_blocks as f64,
            line.blocks_attempted as f64,
        ),
        reception_percentage: calculate_percentage(
            line.successful_receptions as f64,
            line.receptions_attempted as f64,
        ),
        aces_per_match: calculate_average(line.aces as f64, matches),
        digs_per_match: calculate_average(line.digs as f64, matches),
        points_per_match: calculate_average(total_points as f64, matches),
        total_points,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub name: String,
    #[serde(default)]
    pub matches_played: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub sets_won: u32,
    #[serde(default)]
    pub sets_lost: u32,
    #[serde(default)]
    pub points_for: u32,
    #[serde(default)]
    pub points_against: u32,
}

impl TeamRecord {
    pub fn point_differential(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }

    pub fn ranking_points(&self) -> u64 {
        u64::from(self.wins) * POINTS_PER_WIN + u64::from(self.losses) * POINTS_PER_LOSS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPerformance {
    pub win_rate: f64,
    pub loss_rate: f64,
    pub point_differential: i64,
    pub avg_points_for: f64,
    pub avg_points_against: f64,
    pub efficiency: f64,
    pub set_ratio: f64,
}

pub fn team_performance(record: &TeamRecord) -> TeamPerformance {
    let win_rate = calculate_percentage(record.wins as f64, record.matches_played as f64);
    let matches = record.matches_played as usize;
    let set_ratio = if record.sets_lost == 0 {
        record.sets_won as f64
    } else {
        round2(record.sets_won as f64 / record.sets_lost as f64)
    };
    TeamPerformance {
        win_rate,
        loss_rate: round2(100.0 - win_rate),
        point_differential: record.point_differential(),
        avg_points_for: calculate_average(record.points_for as f64, matches),
        avg_points_against: calculate_average(record.points_against as f64, matches),
        efficiency: calculate_percentage(
            record.points_for as f64,
            record.points_for as f64 + record.points_against as f64,
        ),
        set_ratio,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTeam {
    pub rank: u32,
    pub ranking_points: u64,
    pub point_differential: i64,
    pub record: TeamRecord,
}

/// Orders teams by ranking points, then point differential, both descending.
/// Teams with identical keys share a rank; the next distinct key gets the
/// following rank.
pub fn rank_teams(teams: &[TeamRecord]) -> Vec<RankedTeam> {
    let mut sorted: Vec<&TeamRecord> = teams.iter().collect();
    sorted.sort_by(|a, b| {
        b.ranking_points()
            .cmp(&a.ranking_points())
            .then_with(|| b.point_differential().cmp(&a.point_differential()))
    });

    let mut ranked: Vec<RankedTeam> = Vec::with_capacity(sorted.len());
    let mut rank = 0;
    for team in sorted {
        let key = (team.ranking_points(), team.point_differential());
        let same_as_previous = ranked
            .last()
            .is_some_and(|prev| (prev.ranking_points, prev.point_differential) == key);
        if !same_as_previous {
            rank += 1;
        }
        ranked.push(RankedTeam {
            rank,
            ranking_points: key.0,
            point_differential: key.1,
            record: team.clone(),
        });
    }
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub recent_average: f64,
    pub previous_average: f64,
    pub change: f64,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// The threshold applies to raw averaged values; samples of different stat
/// types must be normalized by the caller first.
pub fn performance_trend(recent: &[f64], previous: &[f64]) -> TrendAnalysis {
    let recent_mean = mean(recent);
    let previous_mean = mean(previous);
    let change = recent_mean - previous_mean;
    let trend = if change > TREND_THRESHOLD {
        Trend::Improving
    } else if change < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    };
    TrendAnalysis {
        trend,
        recent_average: round2(recent_mean),
        previous_average: round2(previous_mean),
        change: round2(change),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

/// Weeks are keyed by the Sunday that starts them.
pub fn period_key(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Day => date.format("%Y-%m-%d").to_string(),
        Period::Week => {
            let offset = date.weekday().num_days_from_sunday() as u64;
            let week_start = date.checked_sub_days(Days::new(offset)).unwrap_or(date);
            week_start.format("%Y-%m-%d").to_string()
        }
        Period::Month => date.format("%Y-%m").to_string(),
        Period::Year => date.format("%Y").to_string(),
    }
}

pub fn group_by_period<'a, T>(
    items: &'a [T],
    period: Period,
    date_of: impl Fn(&T) -> NaiveDate,
) -> BTreeMap<String, Vec<&'a T>> {
    let mut groups: BTreeMap<String, Vec<&'a T>> = BTreeMap::new();
    for item in items {
        groups
            .entry(period_key(date_of(item), period))
            .or_default()
            .push(item);
    }
    groups
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
}

pub fn summarize_by_period<T>(
    items: &[T],
    period: Period,
    date_of: impl Fn(&T) -> NaiveDate,
    value_of: impl Fn(&T) -> f64,
) -> BTreeMap<String, PeriodSummary> {
    group_by_period(items, period, date_of)
        .into_iter()
        .map(|(key, group)| {
            let total: f64 = group.iter().map(|item| value_of(item)).sum();
            let summary = PeriodSummary {
                count: group.len(),
                total: round2(total),
                average: calculate_average(total, group.len()),
            };
            (key, summary)
        })
        .collect()
}

/// Highest `metric` first; NaN metrics sort last.
pub fn top_performers<T>(items: &[T], metric: impl Fn(&T) -> f64, limit: usize) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| {
        let (ma, mb) = (metric(a), metric(b));
        match (ma.is_nan(), mb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => mb.total_cmp(&ma),
        }
    });
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str, wins: u32, losses: u32, points_for: u32, points_against: u32) -> TeamRecord {
        TeamRecord {
            team_id: TeamId::new(),
            name: name.to_string(),
            matches_played: wins + losses,
            wins,
            losses,
            sets_won: 0,
            sets_lost: 0,
            points_for,
            points_against,
        }
    }

    #[test]
    fn test_percentage_and_average() {
        assert_eq!(calculate_percentage(50.0, 100.0), 50.0);
        assert_eq!(calculate_percentage(7.0, 0.0), 0.0);
        assert_eq!(calculate_percentage(0.0, 0.0), 0.0);
        assert_eq!(calculate_percentage(1.0, 3.0), 33.33);
        assert_eq!(calculate_percentage(2.0, 3.0), 66.67);

        assert_eq!(calculate_average(10.0, 0), 0.0);
        assert_eq!(calculate_average(10.0, 3), 3.33);
        assert_eq!(calculate_average(9.0, 3), 3.0);
    }

    #[test]
    fn test_player_performance() {
        let line = PlayerStatLine {
            matches_played: 4,
            serves_attempted: 40,
            successful_serves: 36,
            aces: 6,
            attacks_attempted: 50,
            successful_attacks: 20,
            blocks_attempted: 10,
            successful_blocks: 3,
            receptions_attempted: 0,
            successful_receptions: 0,
            digs: 18,
        };
        let perf = player_performance(&line);
        assert_eq!(perf.serve_percentage, 90.0);
        assert_eq!(perf.attack_percentage, 40.0);
        assert_eq!(perf.block_percentage, 30.0);
        assert_eq!(perf.reception_percentage, 0.0);
        assert_eq!(perf.aces_per_match, 1.5);
        assert_eq!(perf.digs_per_match, 4.5);
        assert_eq!(perf.total_points, 29);
        assert_eq!(perf.points_per_match, 7.25);
    }

    #[test]
    fn test_player_lines_sum() {
        let lines = vec![
            PlayerStatLine {
                matches_played: 1,
                aces: 2,
                digs: 5,
                ..Default::default()
            },
            PlayerStatLine {
                matches_played: 1,
                aces: 1,
                digs: 7,
                ..Default::default()
            },
        ];
        let total: PlayerStatLine = lines.iter().sum();
        assert_eq!(total.matches_played, 2);
        assert_eq!(total.aces, 3);
        assert_eq!(total.digs, 12);
    }

    #[test]
    fn test_team_performance() {
        let mut record = team("A", 6, 2, 600, 400);
        record.sets_won = 20;
        record.sets_lost = 8;
        let perf = team_performance(&record);
        assert_eq!(perf.win_rate, 75.0);
        assert_eq!(perf.loss_rate, 25.0);
        assert_eq!(perf.point_differential, 200);
        assert_eq!(perf.avg_points_for, 75.0);
        assert_eq!(perf.avg_points_against, 50.0);
        assert_eq!(perf.efficiency, 60.0);
        assert_eq!(perf.set_ratio, 2.5);

        let empty = team_performance(&team("B", 0, 0, 0, 0));
        assert_eq!(empty.win_rate, 0.0);
        assert_eq!(empty.loss_rate, 100.0);
        assert_eq!(empty.efficiency, 0.0);
    }

    #[test]
    fn test_rank_teams_tiebreak_on_differential() {
        let b = team("B", 10, 2, 280, 250);
        let a = team("A", 10, 2, 300, 200);
        let c = team("C", 11, 0, 250, 240);
        let input = vec![b.clone(), a.clone(), c.clone()];

        let ranked = rank_teams(&input);
        let names: Vec<&str> = ranked.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(ranked[0].ranking_points, 33);
        assert_eq!(ranked[1].ranking_points, 32);
        assert_eq!(
            ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(input, vec![b, a, c]);
    }

    #[test]
    fn test_rank_teams_shares_rank_on_full_tie() {
        let ranked = rank_teams(&[
            team("X", 5, 5, 500, 500),
            team("Y", 5, 5, 480, 480),
            team("Z", 1, 9, 300, 500),
        ]);
        assert_eq!(
            ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 1, 2]
        );
        assert_eq!(ranked[0].record.name, "X");
    }

    #[test]
    fn test_counters_at_u32_limit() {
        let full = PlayerStatLine {
            matches_played: u32::MAX,
            aces: u32::MAX,
            successful_attacks: u32::MAX,
            successful_blocks: u32::MAX,
            ..Default::default()
        };
        let total: PlayerStatLine = [full.clone(), full].iter().sum();
        assert_eq!(total.matches_played, u32::MAX);
        assert_eq!(total.aces, u32::MAX);
        assert_eq!(
            player_performance(&total).total_points,
            u64::from(u32::MAX) * 3
        );

        let busy = team("Busy", u32::MAX, 0, u32::MAX, u32::MAX);
        assert_eq!(team_performance(&busy).efficiency, 50.0);

        let ranked = rank_teams(&[busy, team("Quiet", 2_000_000_000, 0, 0, 0)]);
        assert_eq!(ranked[0].ranking_points, u64::from(u32::MAX) * 3);
        assert_eq!(ranked[1].ranking_points, 6_000_000_000);
    }

    #[test]
    fn test_performance_trend() {
        assert_eq!(
            performance_trend(&[0.6, 0.7], &[0.5, 0.5]).trend,
            Trend::Improving
        );
        assert_eq!(
            performance_trend(&[0.4, 0.4], &[0.5, 0.5]).trend,
            Trend::Declining
        );
        assert_eq!(
            performance_trend(&[0.52, 0.52], &[0.5, 0.5]).trend,
            Trend::Stable
        );
        let analysis = performance_trend(&[], &[]);
        assert_eq!(analysis.trend, Trend::Stable);
        assert_eq!(analysis.change, 0.0);
    }

    #[test]
    fn test_period_keys() {
        // 2024-06-12 is a Wednesday.
        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        assert_eq!(period_key(date, Period::Day), "2024-06-12");
        assert_eq!(period_key(date, Period::Week), "2024-06-09");
        assert_eq!(period_key(date, Period::Month), "2024-06");
        assert_eq!(period_key(date, Period::Year), "2024");

        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(period_key(sunday, Period::Week), "2024-06-09");
    }

    #[test]
    fn test_group_and_summarize_by_period() {
        let matches = vec![
            (NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(), 70.0),
            (NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), 80.0),
            (NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(), 90.0),
        ];
        let groups = group_by_period(&matches, Period::Month, |m| m.0);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["2024-05", "2024-06"]);
        assert_eq!(groups["2024-06"].len(), 2);

        let summary = summarize_by_period(&matches, Period::Month, |m| m.0, |m| m.1);
        assert_eq!(
            summary["2024-06"],
            PeriodSummary {
                count: 2,
                total: 170.0,
                average: 85.0,
            }
        );
    }

    #[test]
    fn test_top_performers() {
        let values = vec![("a", 3.0), ("b", f64::NAN), ("c", 9.0), ("d", 5.0)];
        let top = top_performers(&values, |v| v.1, 2);
        assert_eq!(top.iter().map(|v| v.0).collect::<Vec<_>>(), vec!["c", "d"]);
        let all = top_performers(&values, |v| v.1, 10);
        assert_eq!(all.last().map(|v| v.0), Some("b"));
    }
}

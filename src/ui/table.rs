use tabled::{settings::Style, Table, Tabled};
use crate::config::TierSeed;
use crate::storage::StoreStats;

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Tier")]
    id: String,
    #[tabled(rename = "Discount")]
    discount: String,
    #[tabled(rename = "Posts / month")]
    month_posts_limit: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Records")]
    kind: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn tiers_table(tiers: &[TierSeed]) -> String {
    if tiers.is_empty() {
        return String::new();
    }

    let rows: Vec<TierRow> = tiers
        .iter()
        .map(|tier| TierRow {
            id: tier.id.clone(),
            discount: or_dash(tier.discount.map(|d| format!("{:.1}%", d))),
            month_posts_limit: or_dash(tier.month_posts_limit),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &StoreStats) -> String {
    let rows = vec![
        CountRow { kind: "accounts", count: stats.accounts },
        CountRow { kind: "profiles", count: stats.profiles },
        CountRow { kind: "posts", count: stats.posts },
        CountRow { kind: "membershipTiers", count: stats.membership_tiers },
        CountRow { kind: "total", count: stats.total() },
    ];
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_tiers;

    #[test]
    fn test_tiers_table_lists_every_tier() {
        let rendered = tiers_table(&default_tiers());
        assert!(rendered.contains("basic"));
        assert!(rendered.contains("business"));
        assert!(rendered.contains("5.0%"));
        assert!(tiers_table(&[]).is_empty());
    }

    #[test]
    fn test_stats_table() {
        let stats = StoreStats { accounts: 2, posts: 3, ..Default::default() };
        let rendered = stats_table(&stats);
        assert!(rendered.contains("membershipTiers"));
        assert!(rendered.lines().any(|line| line.contains("total") && line.contains('5')));
    }
}

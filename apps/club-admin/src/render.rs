//! Plain-text rendering of screen view models.

use std::fmt::Write;

use chrono::NaiveDate;

use club_client::Banner;
use club_core::tier::tier_for_points;
use club_core::{DiscountType, Points, Redemption, Tier, Voucher, VoucherPhase, VoucherRow};

pub fn tiers(tiers: &[Tier]) -> String {
    if tiers.is_empty() {
        return "No tiers defined.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<30} {:>8} {:>8}  {:<8} Benefits",
        "ID", "Name", "Min", "Max", "Status"
    );
    for tier in tiers {
        let _ = writeln!(
            out,
            "{:<10} {:<30} {:>8} {:>8}  {:<8} {}",
            tier.id,
            tier.tier_name,
            tier.min_points.value(),
            tier.max_points.value(),
            if tier.active { "active" } else { "inactive" },
            tier.benefits
        );
    }
    out
}

fn discount(voucher: &Voucher) -> String {
    match voucher.discount_type {
        DiscountType::Amount => format!("{:.2} off", voucher.discount_value),
        DiscountType::Percentage => format!("{}% off", voucher.discount_value),
    }
}

fn cost(points: Points) -> String {
    if points.is_zero() {
        "free".to_string()
    } else {
        points.to_string()
    }
}

fn expiry(voucher: &Voucher, today: NaiveDate) -> String {
    match voucher.expiry_date {
        Some(date) if voucher.is_expired(today) => format!("{} (expired)", date),
        Some(date) => date.to_string(),
        None => "-".to_string(),
    }
}

pub fn vouchers(vouchers: &[Voucher], today: NaiveDate) -> String {
    if vouchers.is_empty() {
        return "No vouchers in the catalog.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<20} {:<14} {:>10}  {:<22} Tier",
        "ID", "Code", "Discount", "Cost", "Expires"
    );
    for voucher in vouchers {
        let _ = writeln!(
            out,
            "{:<10} {:<20} {:<14} {:>10}  {:<22} {}",
            voucher.id,
            voucher.code,
            discount(voucher),
            cost(voucher.request_points),
            expiry(voucher, today),
            voucher.tier_name.as_deref().unwrap_or("(all)")
        );
    }
    out
}

/// Member summary and voucher cards.
///
/// `tiers` may be empty (members cannot always list tiers); when it is not,
/// a tier name that disagrees with the tier points is flagged.
pub fn dashboard(
    tier_name: Option<&str>,
    tier_points: Points,
    balance: Points,
    rows: &[VoucherRow],
    tiers: &[Tier],
) -> String {
    let mut out = String::new();
    let _ = write!(out, "Tier:          {}", tier_name.unwrap_or("(none)"));
    if let Some(expected) = tier_for_points(tier_points, tiers) {
        if tier_name != Some(expected.tier_name.as_str()) {
            let _ = write!(out, " (points fall in {})", expected.tier_name);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Tier points:   {}", tier_points);
    let _ = writeln!(out, "Reward points: {}", balance);
    let _ = writeln!(out);

    if rows.is_empty() {
        let _ = writeln!(out, "No vouchers available.");
        return out;
    }

    for row in rows {
        let voucher = &row.voucher.voucher;
        let state = match (row.phase, row.actionable) {
            (VoucherPhase::Redeemed, _) => "redeemed",
            (VoucherPhase::Pending, _) => "pending",
            (VoucherPhase::Available, true) => "available",
            (VoucherPhase::Available, false) => "not enough points",
        };
        let _ = writeln!(
            out,
            "{:<10} {:<20} {:<14} {:>10}  {}",
            voucher.id,
            voucher.code,
            discount(voucher),
            cost(voucher.request_points),
            state
        );
    }
    out
}

pub fn history(records: &[Redemption]) -> String {
    if records.is_empty() {
        return "No vouchers redeemed yet.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{:<10} {:<30} {:?}",
            record.id, record.voucher_code, record.status
        );
    }
    out
}

/// Validation errors, one `field: message` line each.
pub fn field_errors<'a>(errors: impl IntoIterator<Item = (&'a str, String)>) -> String {
    let mut out = String::new();
    for (field, message) in errors {
        let _ = writeln!(out, "  {}: {}", field, message);
    }
    out
}

pub fn banner(banner: &Banner) -> String {
    if banner.is_error() {
        format!("error: {}", banner.message)
    } else {
        banner.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use club_core::{reconcile, redemption::reconcile_with_balance, InFlight};

    #[test]
    fn test_tiers_table() {
        let out = tiers(&[Tier::new("t1", "Bronze", 0, 999).with_benefits("Welcome drink")]);
        assert!(out.lines().nth(1).unwrap().contains("Bronze"));
        assert!(out.contains("Welcome drink"));
        assert!(out.contains("active"));
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_empty_tables() {
        assert_eq!(tiers(&[]), "No tiers defined.\n");
        assert_eq!(vouchers(&[], today()), "No vouchers in the catalog.\n");
    }

    #[test]
    fn test_vouchers_mark_expired() {
        let mut old = Voucher::new("v1", "OLD", 10);
        old.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 18);
        let mut fresh = Voucher::new("v2", "FRESH", 10);
        fresh.expiry_date = NaiveDate::from_ymd_opt(2026, 10, 19);

        let out = vouchers(&[old, fresh], today());
        let line = |code: &str| out.lines().find(|l| l.contains(code)).unwrap().to_string();
        assert!(line("OLD").contains("2026-10-18 (expired)"));
        assert!(!line("FRESH").contains("expired"));
    }

    #[test]
    fn test_dashboard_flags_tier_mismatch() {
        let ladder = vec![
            Tier::new("t1", "Bronze", 0, 999),
            Tier::new("t2", "Gold", 1000, 4999),
        ];
        let p = Points::from_value;

        let matching = dashboard(Some("Gold"), p(1200), p(0), &[], &ladder);
        assert_eq!(matching.lines().next(), Some("Tier:          Gold"));

        let stale = dashboard(Some("Bronze"), p(1200), p(0), &[], &ladder);
        assert_eq!(
            stale.lines().next(),
            Some("Tier:          Bronze (points fall in Gold)")
        );

        let unknown = dashboard(Some("Bronze"), p(1200), p(0), &[], &[]);
        assert_eq!(unknown.lines().next(), Some("Tier:          Bronze"));
    }

    #[test]
    fn test_dashboard_states() {
        let catalog = vec![Voucher::new("v1", "FREE1", 0), Voucher::new("v2", "TEN", 50)];
        let history = vec![Redemption::new("r1", "FREE1-abc123")];
        assert_eq!(reconcile(&catalog, &history).len(), 2);

        let rows = reconcile_with_balance(
            &catalog,
            &history,
            Points::from_value(30),
            &InFlight::new(),
        );
        let out = dashboard(
            Some("Gold"),
            Points::from_value(1200),
            Points::from_value(30),
            &rows,
            &[],
        );

        assert!(out.contains("Reward points: 30 pts"));
        let free = out.lines().find(|l| l.contains("FREE1")).unwrap();
        assert!(free.ends_with("redeemed"));
        let ten = out.lines().find(|l| l.contains("TEN")).unwrap();
        assert!(ten.ends_with("not enough points"));
    }

    #[test]
    fn test_field_errors_lines() {
        let out = field_errors([("tierName", "Tier name is required".to_string())]);
        assert_eq!(out, "  tierName: Tier name is required\n");
    }
}

use chrono::{Months, NaiveDate};

use super::error::{ProjectionError, ProjectionResult};

/// Calendar date of every period: `anchor + period_index` months.
///
/// Month-end anchors clamp to the last day of shorter months (Jan 31 -> Feb 28).
pub fn month_axis(anchor: NaiveDate, periods: usize) -> ProjectionResult<Vec<NaiveDate>> {
    (0..periods)
        .map(|offset| {
            let months = u32::try_from(offset).map_err(|_| {
                ProjectionError::invalid("anchor_date", format!("offset {offset} is too large"))
            })?;
            anchor.checked_add_months(Months::new(months)).ok_or_else(|| {
                ProjectionError::invalid(
                    "anchor_date",
                    format!("{anchor} + {months} months is out of range"),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn axis_starts_at_anchor_and_steps_monthly() {
        let axis = month_axis(date(2024, 3, 15), 14).expect("axis");
        assert_eq!(axis.len(), 14);
        assert_eq!(axis[0], date(2024, 3, 15));
        assert_eq!(axis[1], date(2024, 4, 15));
        assert_eq!(axis[13], date(2025, 4, 15));
    }

    #[test]
    fn month_end_anchor_clamps_without_drifting() {
        let axis = month_axis(date(2023, 1, 31), 3).expect("axis");
        assert_eq!(axis[1], date(2023, 2, 28));
        assert_eq!(axis[2], date(2023, 3, 31));
    }

    #[test]
    fn out_of_range_anchor_is_rejected() {
        let err = month_axis(NaiveDate::MAX, 2).expect_err("must overflow");
        assert!(matches!(
            err,
            ProjectionError::InvalidInput { field: "anchor_date", .. }
        ));
    }
}

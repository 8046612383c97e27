//! Search helpers over table columns.
//!
//! Two layouts are searched:
//!
//! - **Sorted key columns** (`CustomAttribute.Parent`, `Constant.Parent`, ...): the table is
//!   sorted by the key, so all rows with one key form a contiguous run. [`equal_range`] binary
//!   searches one matching row and then expands to both sides.
//! - **List columns** (`TypeDef.FieldList`, `MethodDef.ParamList`, ...): each owner stores the
//!   first row of its run and runs are consecutive, so the column is non-decreasing. Owners with
//!   no children share their start with the next owner. [`owner_of`] finds a slot whose start is
//!   not above the target and then skips forward over every owner that starts at or before it,
//!   which lands on the last owner of a group of equal starts.

use std::ops::Range;

use crate::{metadata::tables::MetadataTable, Result};

/// All rows of a sorted `table` whose `column` equals `value`, as a row id range.
///
/// Returns an empty range if no row matches.
///
/// # Errors
/// Returns an error if a row cannot be read.
pub fn equal_range(table: &MetadataTable, column: usize, value: u32) -> Result<Range<u32>> {
    let mut low = 1_u32;
    let mut high = table.row_count();

    while low <= high {
        let mid = low + (high - low) / 2;
        let current = table.column(mid, column)?;

        if current == value {
            let mut first = mid;
            while first > 1 && table.column(first - 1, column)? == value {
                first -= 1;
            }

            let mut last = mid;
            while last < table.row_count() && table.column(last + 1, column)? == value {
                last += 1;
            }

            return Ok(first..last + 1);
        }

        if current < value {
            low = mid + 1;
        } else if mid == 1 {
            break;
        } else {
            high = mid - 1;
        }
    }

    Ok(1..1)
}

/// All rows of `table` whose `column` equals `value`, found by scanning every row.
///
/// # Errors
/// Returns an error if a row cannot be read.
pub fn linear_matches(table: &MetadataTable, column: usize, value: u32) -> Result<Vec<u32>> {
    let mut matches = Vec::new();
    for row in table {
        if row.column(column)? == value {
            matches.push(row.rid);
        }
    }

    Ok(matches)
}

/// The owner row whose run in list `column` contains `target`.
///
/// `target` is a logical row id of the list table. Returns `None` if `target` lies before the
/// first owner's run or the owner table is empty. The caller checks that `target` does not
/// exceed the list table.
///
/// # Errors
/// Returns an error if a row cannot be read.
pub fn owner_of(table: &MetadataTable, column: usize, target: u32) -> Result<Option<u32>> {
    let rows = table.row_count();
    if rows == 0 || target == 0 {
        return Ok(None);
    }

    // slot: some owner with start <= target, or none
    let mut low = 1_u32;
    let mut high = rows;
    let mut slot = None;

    while low <= high {
        let mid = low + (high - low) / 2;
        let start = table.column(mid, column)?;

        if start == target {
            slot = Some(mid);
            break;
        }

        if start < target {
            slot = Some(mid);
            low = mid + 1;
        } else if mid == 1 {
            break;
        } else {
            high = mid - 1;
        }
    }

    let Some(mut owner) = slot else {
        return Ok(None);
    };

    while owner < rows && table.column(owner + 1, column)? <= target {
        owner += 1;
    }

    Ok(Some(owner))
}

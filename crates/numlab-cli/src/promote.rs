//! `promote` subcommand handler

use crate::utils::parse_kind_or_exit;
use numlab_core::lower::LowerOptions;
use numlab_core::numeric::{ArithOp, NumericKind};

pub fn handle_promote(left: &str, right: &str, options: &LowerOptions) {
    let left = parse_kind_or_exit(left, options);
    let right = parse_kind_or_exit(right, options);
    print!("{}", describe_promotion(&left, &right));
}

/// The promoted kind, plus a second line for `/` when it differs
pub fn describe_promotion(left: &NumericKind, right: &NumericKind) -> String {
    let promoted = NumericKind::promote(left, right);
    let divided = NumericKind::result_kind(ArithOp::Div, left, right);
    let mut out = format!("{promoted}\n");
    if divided != promoted {
        out.push_str(&format!("{divided} (for /)\n"));
    }
    out
}

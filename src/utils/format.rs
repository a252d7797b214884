/// Formats a number with `,` thousands separators and no decimal places.
///
/// Rounding follows `{:.0}`, so exact halves go to the even neighbour.
pub fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value.is_sign_negative() && digits != "0" {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

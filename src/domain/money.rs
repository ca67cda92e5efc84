/// Money is represented as whole Colombian pesos (COP has no circulating
/// fractional unit in practice), so 50000 pesos is stored as the integer 50000.
/// Negative amounts are allowed and flow through the balance arithmetic.
pub type Pesos = i64;

/// Format pesos as a human-readable currency string with dot-grouped
/// thousands and no decimals.
/// Example: 1234567 -> "$ 1.234.567", -500000 -> "-$ 500.000"
pub fn format_pesos(value: Pesos) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let digits = value.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let first_group = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i % 3) == first_group {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}$ {}", sign, grouped)
}

/// Parse user-entered money text into pesos.
///
/// Strips currency symbols, grouping dots and spaces before parsing. Anything
/// that still isn't a plain integer (including the empty string) counts as 0:
/// monetary fields left blank or filled with junk behave exactly like an
/// explicit 0. Negative amounts are accepted as-is.
pub fn parse_pesos(input: &str) -> Pesos {
    let clean: String = input
        .chars()
        .filter(|c| !matches!(c, '$' | '.' | ' '))
        .collect();
    clean.parse().unwrap_or(0)
}

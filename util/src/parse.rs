//! Tiny hand-rolled parser combinators for short data strings.

pub type Result<'a, T> = std::result::Result<(T, &'a str), &'a str>;

/// Parse an unsigned decimal number from the start of input.
pub fn number(input: &str) -> Result<i32> {
    let end_pos = input
        .char_indices()
        .find_map(|(i, c)| (!c.is_ascii_digit()).then_some(i))
        .unwrap_or(input.len());

    if end_pos == 0 {
        return Err(input);
    }

    match input[..end_pos].parse::<i32>() {
        Ok(n) => Ok((n, &input[end_pos..])),
        Err(_) => Err(input),
    }
}

/// Match a literal prefix.
pub fn symbol<'a>(sym: &str, input: &'a str) -> Result<'a, ()> {
    match input.strip_prefix(sym) {
        Some(rest) => Ok(((), rest)),
        None => Err(input),
    }
}

/// Return the rest of the input if it is only whitespace.
pub fn end(input: &str) -> Result<()> {
    if input.trim().is_empty() {
        Ok(((), ""))
    } else {
        Err(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number() {
        assert_eq!(number("13d6"), Ok((13, "d6")));
        assert_eq!(number("d6"), Err("d6"));
        assert_eq!(number("99999999999"), Err("99999999999"));
    }

    #[test]
    fn test_symbol() {
        assert_eq!(symbol("d", "d6"), Ok(((), "6")));
        assert_eq!(symbol("+", "d6"), Err("d6"));
        assert_eq!(end("  "), Ok(((), "")));
        assert_eq!(end(" x"), Err(" x"));
    }
}

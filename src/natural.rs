//! Natural (numeric-aware) ordering for file names.
//!
//! `episode2.mkv` sorts before `episode10.mkv`: maximal runs of ASCII digits
//! are compared by value, everything else as text.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Digits(&'a str),
    Text(&'a str),
}

/// Split `s` into alternating digit / non-digit runs. Empty runs never appear.
fn segments(s: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_segment(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(prev) = in_digits {
        out.push(make_segment(&s[start..], prev));
    }
    out
}

fn make_segment(run: &str, digits: bool) -> Segment<'_> {
    if digits {
        Segment::Digits(run)
    } else {
        Segment::Text(run)
    }
}

/// Compare two digit runs by integer value without parsing, so arbitrarily
/// long runs never overflow.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Case-insensitive first, exact code points as the tie-break.
fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

fn segment_text<'a>(seg: &Segment<'a>) -> &'a str {
    match *seg {
        Segment::Digits(s) | Segment::Text(s) => s,
    }
}

/// Natural comparison of two names.
///
/// Segments are compared pairwise up to the shorter sequence; when all of
/// them are equal the name with fewer segments sorts first. Digit runs that
/// only differ by leading zeros (`v2` / `v02`) compare equal.
pub fn compare(a: &str, b: &str) -> Ordering {
    let a_parts = segments(a);
    let b_parts = segments(b);

    for (x, y) in a_parts.iter().zip(b_parts.iter()) {
        let ord = match (x, y) {
            (Segment::Digits(x), Segment::Digits(y)) => compare_digits(x, y),
            _ => compare_text(segment_text(x), segment_text(y)),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_parts.len().cmp(&b_parts.len())
}

//! French cardinal numbers
//!
//! Produces the traditional spelling: hyphens inside the tens, spaces around
//! "cent", "mille", "million" and "milliard", "et un" for 21 to 71, and the
//! plural "s" on "vingts"/"cents" only when nothing follows them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const UNITS: [&str; 20] = [
    "zéro", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix",
    "onze", "douze", "treize", "quatorze", "quinze", "seize", "dix-sept", "dix-huit",
    "dix-neuf",
];

const TENS: [&str; 7] = [
    "", "", "vingt", "trente", "quarante", "cinquante", "soixante",
];

/// Largest value spelled out; anything bigger is read digit by digit by the voice
pub const MAX: u64 = 999_999_999_999;

/// Spell out `n` in standard French, `None` above [`MAX`]
pub fn cardinal(n: u64) -> Option<String> {
    if n > MAX {
        return None;
    }
    if n == 0 {
        return Some(UNITS[0].to_string());
    }

    let billions = n / 1_000_000_000;
    let millions = (n / 1_000_000) % 1000;
    let thousands = (n / 1000) % 1000;
    let rest = n % 1000;

    let mut parts = Vec::new();
    if billions > 0 {
        parts.push(scale(billions, "milliard"));
    }
    if millions > 0 {
        parts.push(scale(millions, "million"));
    }
    if thousands == 1 {
        parts.push("mille".to_string());
    } else if thousands > 1 {
        // "mille" is invariable and strips the plural of the number before it
        parts.push(format!("{} mille", below_1000(thousands, false)));
    }
    if rest > 0 {
        parts.push(below_1000(rest, true));
    }

    Some(parts.join(" "))
}

/// "milliard" and "million" are nouns: they take the plural and keep "vingts"
fn scale(count: u64, noun: &str) -> String {
    let plural = if count > 1 { "s" } else { "" };
    format!("{} {}{}", below_1000(count, true), noun, plural)
}

fn below_1000(n: u64, last: bool) -> String {
    let hundreds = n / 100;
    let rest = n % 100;

    if hundreds == 0 {
        return below_100(rest, last);
    }

    let head = if hundreds == 1 {
        "cent".to_string()
    } else {
        format!("{} cent", UNITS[hundreds as usize])
    };

    if rest == 0 {
        if hundreds > 1 && last {
            format!("{}s", head)
        } else {
            head
        }
    } else {
        format!("{} {}", head, below_100(rest, last))
    }
}

fn below_100(n: u64, last: bool) -> String {
    let n = n as usize;
    if n < 20 {
        return UNITS[n].to_string();
    }

    let tens = n / 10;
    let unit = n % 10;

    match tens {
        7 => match unit {
            1 => "soixante et onze".to_string(),
            _ => format!("soixante-{}", UNITS[10 + unit]),
        },
        8 if unit == 0 => {
            if last {
                "quatre-vingts".to_string()
            } else {
                "quatre-vingt".to_string()
            }
        }
        8 => format!("quatre-vingt-{}", UNITS[unit]),
        9 => format!("quatre-vingt-{}", UNITS[10 + unit]),
        _ => match unit {
            0 => TENS[tens].to_string(),
            1 => format!("{} et un", TENS[tens]),
            _ => format!("{}-{}", TENS[tens], UNITS[unit]),
        },
    }
}

/// Standard phrasing of 70-79 and 90-99 mapped to the Swiss/Belgian words
static REGIONAL: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    let mut table = Vec::with_capacity(20);
    for (standard, regional) in [("soixante", "septante"), ("quatre-vingt", "nonante")] {
        table.push((format!("{}-dix", standard), regional.to_string()));
        for unit in 1..10 {
            let from = if standard == "soixante" && unit == 1 {
                "soixante et onze".to_string()
            } else {
                format!("{}-{}", standard, UNITS[10 + unit])
            };
            let to = if unit == 1 {
                format!("{} et un", regional)
            } else {
                format!("{}-{}", regional, UNITS[unit])
            };
            table.push((from, to));
        }
    }
    table
});

static REGIONAL_LOOKUP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    REGIONAL
        .iter()
        .map(|(from, to)| (from.as_str(), to.as_str()))
        .collect()
});

/// Alternation over the standard phrasings, longest first so "soixante-dix-sept"
/// wins over its prefix "soixante-dix"
static REGIONAL_RE: Lazy<Option<Regex>> = Lazy::new(|| {
    let mut keys: Vec<&str> = REGIONAL.iter().map(|(from, _)| from.as_str()).collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
    let pattern = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).ok()
});

/// Rewrite a standard French spelling with "septante" and "nonante"
pub fn regionalize(spelled: &str) -> String {
    let Some(re) = REGIONAL_RE.as_ref() else {
        return spelled.to_string();
    };
    re.replace_all(spelled, |caps: &regex::Captures| {
        let matched = &caps[0];
        REGIONAL_LOOKUP
            .get(matched)
            .map(|s| s.to_string())
            .unwrap_or_else(|| matched.to_string())
    })
    .into_owned()
}

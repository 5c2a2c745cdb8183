//! English cardinal numbers

const UNITS: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 3] = [
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1000, "thousand"),
];

/// Largest value spelled out
pub const MAX: u64 = 999_999_999_999;

/// Spell out `n` in English, `None` above [`MAX`]
pub fn cardinal(n: u64) -> Option<String> {
    if n > MAX {
        return None;
    }
    if n == 0 {
        return Some(UNITS[0].to_string());
    }

    let mut parts = Vec::new();
    let mut rest = n;
    for (size, name) in SCALES {
        let count = rest / size;
        if count > 0 {
            parts.push(format!("{} {}", below_1000(count), name));
            rest %= size;
        }
    }
    if rest > 0 {
        parts.push(below_1000(rest));
    }

    Some(parts.join(" "))
}

fn below_1000(n: u64) -> String {
    let hundreds = (n / 100) as usize;
    let rest = (n % 100) as usize;

    let tail = match rest {
        0 => None,
        r if r < 20 => Some(UNITS[r].to_string()),
        r if r % 10 == 0 => Some(TENS[r / 10].to_string()),
        r => Some(format!("{}-{}", TENS[r / 10], UNITS[r % 10])),
    };

    match (hundreds, tail) {
        (0, Some(tail)) => tail,
        (h, Some(tail)) => format!("{} hundred {}", UNITS[h], tail),
        (h, None) => format!("{} hundred", UNITS[h]),
    }
}

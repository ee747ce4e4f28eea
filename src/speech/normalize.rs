//! Text cleanup before speaking
//!
//! Model replies are often markdown. Markup is stripped, a handful of
//! abbreviations and symbols are spelled out and clock times are read as
//! words so the voice does not trip over them.

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("Mr.", "Mister"),
    ("Mrs.", "Misses"),
    ("Ms.", "Miss"),
    ("Dr.", "Doctor"),
    ("Prof.", "Professor"),
    ("vs.", "versus"),
    ("etc.", "etcetera"),
    ("e.g.", "for example"),
    ("i.e.", "that is"),
    ("approx.", "approximately"),
];

const SYMBOLS: &[(&str, &str)] = &[
    ("&", " and "),
    ("%", " percent"),
    ("@", " at "),
    ("$", " dollars "),
    ("€", " euros "),
    ("£", " pounds "),
    ("+", " plus "),
    ("=", " equals "),
];

/// Prepare a response for the speech engine
pub fn normalize_text(text: &str) -> String {
    let mut result = strip_markdown(text);

    for (abbrev, expansion) in ABBREVIATIONS {
        result = result.replace(abbrev, expansion);
    }
    for (symbol, spoken) in SYMBOLS {
        result = result.replace(symbol, spoken);
    }

    result = expand_clock_times(&result);

    result
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,!?;:'-\"()".contains(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_markdown(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(|line| {
            let line = line.trim_start();
            let line = line.trim_start_matches('#').trim_start();
            let line = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .unwrap_or(line);
            line.replace("**", "")
                .replace("__", "")
                .replace('`', "")
                .replace('*', "")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "3:30" becomes "three thirty", "9:00" becomes "nine o'clock"
fn expand_clock_times(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_digit() {
            result.push(c);
            continue;
        }

        let mut hours = String::from(c);
        while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            hours.push(d);
            chars.next();
        }

        if chars.peek() != Some(&':') {
            result.push_str(&hours);
            continue;
        }
        chars.next();

        let mut minutes = String::new();
        while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            if minutes.len() == 2 {
                break;
            }
            minutes.push(d);
            chars.next();
        }

        match (number_to_words(&hours), minutes.as_str()) {
            (Some(h), "00") => result.push_str(&format!("{} o'clock", h)),
            (Some(h), m) if m.len() == 2 => match number_to_words(m) {
                Some(m) if minutes.starts_with('0') => {
                    result.push_str(&format!("{} oh {}", h, m))
                }
                Some(m) => result.push_str(&format!("{} {}", h, m)),
                None => result.push_str(&format!("{}:{}", hours, minutes)),
            },
            _ => {
                result.push_str(&hours);
                result.push(':');
                result.push_str(&minutes);
            }
        }
    }

    result
}

fn number_to_words(digits: &str) -> Option<String> {
    const ONES: [&str; 20] = [
        "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
        "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen",
        "eighteen", "nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
    ];

    let n: usize = digits.parse().ok()?;
    match n {
        0..=19 => Some(ONES[n].to_string()),
        20..=99 if n % 10 == 0 => Some(TENS[n / 10].to_string()),
        20..=99 => Some(format!("{}-{}", TENS[n / 10], ONES[n % 10])),
        _ => None,
    }
}

//! The demo runs behind each CLI subcommand, over fixed test data.
//!
//! Prompt functions come from a caller-supplied factory so the runs work
//! with any backend. Output goes to `out` as Markdown tables.

use crate::chat::Chat;
use crate::model::LlmBackend;
use crate::prompt::{PromptConfig, PromptFunction};
use crate::timing::{timed, timer, LatencySummary};
use anyhow::Result;
use std::io::Write;

pub const COUNTRY_INSTRUCTION: &str =
    "Which country is this city located in? Output ONLY the Country name";

pub const CITIES: &[&str] = &["Vancouver", "Toronto", "San Francisco", "Hong Kong"];

pub const CATEGORY_INSTRUCTION: &str = "Categorize the merchant type. Output exactly one full English word, lowercase, fully spelled out, no abbreviations, no partial words, and no punctuation.  Categories: grocery, retail, restaurant, pharmacy, entertainment, transportation, clothing, lodging, electronics, food, delivery, telecom, services:";

pub const MERCHANTS: &[&str] = &[
    "Amazon",
    "Starbucks",
    "Walmart",
    "Target",
    "Apple Store",
    "Costco",
    "Uber",
    "McDonald's",
    "Netflix",
    "Best Buy",
    "Shell",
    "CVS Pharmacy",
    "Home Depot",
    "Walgreens",
    "Nike",
    "Subway",
    "Delta Airlines",
    "Spotify",
    "Lowe's",
    "Chipotle",
    "Airbnb",
    "FedEx",
    "Whole Foods Market",
    "H&M",
    "Google Play",
    "AT&T",
    "IKEA",
    "Domino's Pizza",
    "Burger King",
    "eBay",
];

pub const NAME_INSTRUCTION: &str =
    "Extract the person's full name from the following sentence, output only name:";
pub const DATE_INSTRUCTION: &str =
    "Extract the date mentioned in the following sentence, output only date in the format YYYY-MM-DD:";

pub const SENTENCES: &[&str] = &[
    "Emily Zhang arrived in Montreal on March 15, 2021 for the conference.",
    "We had dinner with Carlos Rivera on August 3rd, 2023 in Vancouver.",
    "Sophie Dubois moved to Toronto back on July 1, 2020.",
    "I met Arjun Patel during the hackathon on November 12th, 2022.",
    "Li Wei submitted her thesis on May 9, 2019.",
    "Michael Thompson's flight was delayed on February 28, 2024.",
    "On June 10, 2023, I saw Amara Okafor present her AI project.",
    "Benjamin Lee joined the company on October 5th, 2018.",
    "Fatima Hassan gave her keynote speech on September 14, 2022.",
    "We last heard from Hiroshi Tanaka on December 31st, 2021.",
];

pub const CHAT_NATURAL: &[&str] = &[
    "Ottawa is the capital city of which country? Output only the country name.",
    "Give me the country name where Tokyo is the capital city of? Output only the country name.",
    "Which country is Beijing is the capital city of? Output only the country name.",
];

pub const CHAT_STRUCTURED: &[&str] = &[
    "For the following capital city, output the country name the city belongs to, output only the name: Ottawa",
    "For the following capital city, output the country name the city belongs to, output only the name: Tokyo",
    "For the following capital city, output the country name the city belongs to, output only the name: Beijing",
];

pub fn countries<B, F>(mut make: F, base: &PromptConfig, out: &mut dyn Write) -> Result<LatencySummary>
where
    B: LlmBackend,
    F: FnMut(&str, &PromptConfig) -> Result<PromptFunction<B>>,
{
    let find_country = make(COUNTRY_INSTRUCTION, &base.clone().with_max_tokens(5))?;
    let mut summary = LatencySummary::new();
    for city in CITIES {
        let (country, ms) = timed(|| find_country.invoke(city));
        summary.record(ms);
        writeln!(out, "{} is located in {}", city, country?)?;
    }
    Ok(summary)
}

pub fn categories<B, F>(mut make: F, base: &PromptConfig, out: &mut dyn Write) -> Result<LatencySummary>
where
    B: LlmBackend,
    F: FnMut(&str, &PromptConfig) -> Result<PromptFunction<B>>,
{
    let extract_category = make(CATEGORY_INSTRUCTION, base)?;
    let mut summary = LatencySummary::new();

    writeln!(out, "| Merchant | Category | Elapse Time (ms) |")?;
    writeln!(out, "| -------- | -------- | ---------------- |")?;
    for merchant in MERCHANTS {
        let t = timer();
        let category = extract_category.invoke(merchant)?;
        let ms = t.elapsed_ms();
        summary.record(ms);
        writeln!(out, "| {} | {} | {:.2} |", merchant, category, ms)?;
    }
    Ok(summary)
}

pub fn extract<B, F>(mut make: F, base: &PromptConfig, out: &mut dyn Write) -> Result<LatencySummary>
where
    B: LlmBackend,
    F: FnMut(&str, &PromptConfig) -> Result<PromptFunction<B>>,
{
    let extract_name = make(NAME_INSTRUCTION, &base.clone().with_max_tokens(5))?;
    let extract_date = make(DATE_INSTRUCTION, &base.clone().with_max_tokens(20))?;
    let mut summary = LatencySummary::new();

    writeln!(out, "| name | date | elapsed time in ms (name) | elapsed time in ms (date) |")?;
    writeln!(out, "| ---- | ---- | ------------------------- | ------------------------- |")?;
    for sentence in SENTENCES {
        let (name, n_ms) = timed(|| extract_name.invoke(sentence));
        let (date, d_ms) = timed(|| extract_date.invoke(sentence));
        summary.record(n_ms);
        summary.record(d_ms);
        writeln!(out, "| {} | {} | {:.2} | {:.2} |", name?, date?, n_ms, d_ms)?;
    }
    Ok(summary)
}

pub fn chat<B, F>(open: F, out: &mut dyn Write) -> Result<LatencySummary>
where
    B: LlmBackend,
    F: FnOnce() -> Result<B>,
{
    let (backend, load_ms) = timed(open);
    writeln!(out, "Model load time: {:.2} ms", load_ms)?;
    let chat = Chat::new(backend?, Default::default());
    let mut summary = LatencySummary::new();

    let sections = [
        ("Chat calls when query is in natural language:", CHAT_NATURAL),
        (
            "Chat calls with query is structured, with variable query term at the end:",
            CHAT_STRUCTURED,
        ),
    ];
    for (heading, questions) in sections {
        writeln!(out, "{}", heading)?;
        for q in questions {
            let (reply, ms) = timed(|| chat.ask(q));
            summary.record(ms);
            writeln!(out, "{} ({:.2} ms)", reply?, ms)?;
        }
    }
    Ok(summary)
}

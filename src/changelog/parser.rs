use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use super::document::{Changelog, Link, Release, Unreleased};
use crate::error::{ReleaseError, Result};

const UNRELEASED: &str = "unreleased";

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^##\s+(?:\[(?P<bracketed>[^\]]+)\]|(?P<bare>\S+))(?P<rest>.*)$")
            .expect("heading pattern is valid")
    })
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(?P<label>[^\]]+)\]:\s*(?P<url>\S+)\s*$").expect("link pattern is valid")
    })
}

enum Section {
    Unreleased,
    Release(Release),
}

struct Heading {
    section: Section,
    lines: Vec<String>,
}

/// Parses changelog text.
///
/// Second-level headings start sections: `## [Unreleased]` (case-insensitive)
/// and `## [1.2.3] - 2024-01-31`, with optional brackets, date and
/// `[YANKED]` marker. Link definitions are lifted out of the sections and
/// attached to the matching heading when one exists.
pub fn parse(text: &str) -> Result<Changelog> {
    let mut preamble = Vec::new();
    let mut sections: Vec<Heading> = Vec::new();
    let mut links: Vec<Link> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = link_regex().captures(line) {
            links.push(Link {
                label: caps["label"].to_string(),
                url: caps["url"].to_string(),
            });
            continue;
        }

        if let Some(caps) = heading_regex().captures(line) {
            let label = caps
                .name("bracketed")
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            let section = parse_heading(label, &caps["rest"]);
            sections.push(Heading {
                section,
                lines: Vec::new(),
            });
            continue;
        }

        match sections.last_mut() {
            Some(current) => current.lines.push(line.to_string()),
            None => preamble.push(line.to_string()),
        }
    }

    let mut changelog = Changelog {
        preamble: trim_blank_lines(&preamble),
        ..Default::default()
    };

    for heading in sections {
        let body = trim_blank_lines(&heading.lines);
        match heading.section {
            Section::Unreleased => {
                if changelog.unreleased.is_some() {
                    return Err(ReleaseError::parse("duplicate unreleased section"));
                }
                changelog.unreleased = Some(Unreleased { body, url: None });
            }
            Section::Release(mut release) => {
                if changelog.releases.iter().any(|r| r.title == release.title) {
                    return Err(ReleaseError::parse(format!(
                        "duplicate release section '{}'",
                        release.title
                    )));
                }
                release.body = body;
                changelog.releases.push(release);
            }
        }
    }

    for link in links {
        if link.label.eq_ignore_ascii_case(UNRELEASED) {
            if let Some(unreleased) = changelog.unreleased.as_mut() {
                unreleased.url = Some(link.url);
                continue;
            }
        }

        match changelog
            .releases
            .iter_mut()
            .find(|r| r.title == link.label && r.url.is_none())
        {
            Some(release) => release.url = Some(link.url),
            None => changelog.links.push(link),
        }
    }

    Ok(changelog)
}

fn parse_heading(label: &str, rest: &str) -> Section {
    if label.eq_ignore_ascii_case(UNRELEASED) {
        return Section::Unreleased;
    }

    let mut rest = rest.trim();
    let yanked = rest.to_ascii_uppercase().ends_with("[YANKED]");
    if yanked {
        rest = rest[..rest.len() - "[YANKED]".len()].trim_end();
    }
    let date = rest.trim_start_matches('-').trim();

    Section::Release(Release {
        title: label.to_string(),
        version: Version::parse(label.trim_start_matches('v')).ok(),
        date: (!date.is_empty()).then(|| date.to_string()),
        yanked,
        url: None,
        body: String::new(),
    })
}

fn trim_blank_lines(lines: &[String]) -> String {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end.max(start)].join("\n")
}

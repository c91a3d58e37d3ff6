use std::fmt;

use super::document::{Changelog, Release};

fn release_heading(release: &Release) -> String {
    let mut heading = format!("## [{}]", release.title);
    if let Some(date) = &release.date {
        heading.push_str(" - ");
        heading.push_str(date);
    }
    if release.yanked {
        heading.push_str(" [YANKED]");
    }
    heading
}

fn section(heading: String, body: &str) -> String {
    if body.is_empty() {
        heading
    } else {
        format!("{}\n\n{}", heading, body)
    }
}

impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks = Vec::new();
        let mut links = Vec::new();

        if !self.preamble.is_empty() {
            blocks.push(self.preamble.clone());
        }

        if let Some(unreleased) = &self.unreleased {
            blocks.push(section("## [Unreleased]".to_string(), &unreleased.body));
            if let Some(url) = &unreleased.url {
                links.push(format!("[Unreleased]: {}", url));
            }
        }

        for release in &self.releases {
            blocks.push(section(release_heading(release), &release.body));
            if let Some(url) = &release.url {
                links.push(format!("[{}]: {}", release.title, url));
            }
        }

        links.extend(self.links.iter().map(|l| format!("[{}]: {}", l.label, l.url)));
        if !links.is_empty() {
            blocks.push(links.join("\n"));
        }

        writeln!(f, "{}", blocks.join("\n\n"))
    }
}

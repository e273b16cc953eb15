//! Segmentation of the awesome-cve-poc README into exploit entries.
//!
//! The list has no per-entry delimiter: an entry starts at a text node that is
//! exactly a CVE identifier and runs until the next one. Nothing before the
//! "Resource" marker is considered.

use std::collections::BTreeSet;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, TextMergeStream};

use super::cve_id::is_cve_id;

const GITHUB_ORIGIN: &str = "https://github.com";
/// Repository path that relative README links are resolved against.
const AWESOME_POC_BASE_PATH: [&str; 4] = ["qazbnm456", "awesome-cve-poc", "blob", "master"];

const START_MARKER: &str = "Resource";

/// One node of a parsed markdown tree, as seen by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Text(&'a str),
    Link { destination: &'a str },
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AwesomePocEntry {
    pub cve_id: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerState {
    Inactive,
    Active,
}

/// Single-pass visitor that accumulates entries as nodes stream by.
#[derive(Debug)]
pub struct AwesomePocWalker {
    state: WalkerState,
    entries: BTreeSet<AwesomePocEntry>,
    filling: AwesomePocEntry,
}

impl Default for AwesomePocWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl AwesomePocWalker {
    pub fn new() -> Self {
        Self {
            state: WalkerState::Inactive,
            entries: BTreeSet::new(),
            filling: AwesomePocEntry::default(),
        }
    }

    pub fn state(&self) -> WalkerState {
        self.state
    }

    /// Feed one node. `entering` is false when a container node is being closed.
    pub fn visit(&mut self, node: Node<'_>, entering: bool) {
        if let Node::Text(START_MARKER) = node {
            self.state = WalkerState::Active;
            self.entries.clear();
            return;
        }
        if self.state == WalkerState::Inactive {
            return;
        }

        match node {
            Node::Text(text) if entering => {
                if is_cve_id(text) {
                    self.commit_filling();
                    self.filling = AwesomePocEntry {
                        cve_id: text.to_string(),
                        ..Default::default()
                    };
                } else if self.is_filling() && self.filling.description.is_empty() && !text.is_empty() {
                    self.filling.description = text.to_string();
                }
            }
            // Links are examined on both enter and exit, so a link wrapping the
            // identifier itself still lands on the entry it opened.
            Node::Link { destination } => {
                if self.is_filling() && self.filling.url.is_empty() {
                    self.filling.url = resolve_link(destination);
                }
            }
            _ => {}
        }
    }

    /// End of document: commit the in-progress entry and hand back the set.
    pub fn finish(mut self) -> BTreeSet<AwesomePocEntry> {
        self.commit_filling();
        self.entries
    }

    fn is_filling(&self) -> bool {
        !self.filling.cve_id.is_empty()
    }

    fn commit_filling(&mut self) {
        if self.filling != AwesomePocEntry::default() {
            self.entries.insert(std::mem::take(&mut self.filling));
        }
    }
}

/// Rewrite scheme-less destinations against the awesome-cve-poc repository.
///
/// The joined path is cleaned: `.` and empty segments are dropped and `..`
/// removes the preceding segment, never climbing above the GitHub origin.
pub fn resolve_link(destination: &str) -> String {
    if has_scheme(destination) {
        return destination.to_string();
    }
    let mut segments: Vec<&str> = AWESOME_POC_BASE_PATH.to_vec();
    for segment in destination.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return GITHUB_ORIGIN.to_string();
    }
    format!("{}/{}", GITHUB_ORIGIN, segments.join("/"))
}

fn has_scheme(destination: &str) -> bool {
    match destination.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Parse a README body and walk it, returning the distinct entries.
pub fn parse_awesome_poc(markdown: &str) -> BTreeSet<AwesomePocEntry> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut walker = AwesomePocWalker::new();
    // Destinations of the links currently open, innermost last.
    let mut open_links = Vec::new();
    // Entities and escapes split a run of text into several events
    for event in TextMergeStream::new(Parser::new_ext(markdown, options)) {
        match event {
            Event::Text(text) | Event::Code(text) => walker.visit(Node::Text(&text), true),
            Event::Start(Tag::Link { dest_url, .. }) => {
                walker.visit(Node::Link { destination: &dest_url }, true);
                open_links.push(dest_url);
            }
            Event::End(TagEnd::Link) => match open_links.pop() {
                Some(dest_url) => walker.visit(Node::Link { destination: &dest_url }, false),
                None => walker.visit(Node::Other, false),
            },
            Event::Start(_) => walker.visit(Node::Other, true),
            Event::End(_) => walker.visit(Node::Other, false),
            _ => {}
        }
    }
    walker.finish()
}

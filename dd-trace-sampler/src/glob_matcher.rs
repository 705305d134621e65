// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::constants::cache::GLOB_MATCH_CACHE_SIZE;

/// A backtracking implementation of the glob matching algorithm.
///
/// The glob pattern language supports `*` as a multiple character wildcard
/// (including the empty string) and `?` as a single character wildcard. The
/// match is case insensitive.
///
/// Previously matched subjects are kept in an LRU cache since rule matching
/// sees the same service and operation names over and over.
pub struct GlobMatcher {
    /// The original glob pattern
    pattern: String,
    /// Lowercased pattern for case-insensitive matching
    pattern_lower: String,
    /// LRU cache of previously matched strings to their results
    cache: Mutex<LruCache<String, bool>>,
}

impl fmt::Debug for GlobMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobMatcher")
            .field("pattern", &self.pattern)
            .finish()
    }
}

impl GlobMatcher {
    /// Creates a new GlobMatcher with the given pattern
    pub fn new(pattern: &str) -> Self {
        let cache_size = NonZeroUsize::new(GLOB_MATCH_CACHE_SIZE)
            .unwrap_or(NonZeroUsize::MIN);
        GlobMatcher {
            pattern: pattern.to_string(),
            pattern_lower: pattern.to_lowercase(),
            cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    /// Returns the original pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Checks if the given subject matches the glob pattern.
    /// The match is case insensitive.
    pub fn matches(&self, subject: &str) -> bool {
        let subject_lower = subject.to_lowercase();

        if let Some(&hit) = self.cache.lock().unwrap().get(&subject_lower) {
            return hit;
        }

        let result = glob_match(self.pattern_lower.as_bytes(), subject_lower.as_bytes());
        self.cache.lock().unwrap().put(subject_lower, result);
        result
    }
}

impl Clone for GlobMatcher {
    fn clone(&self) -> Self {
        // a fresh matcher with the same pattern, caches are not shared
        GlobMatcher::new(&self.pattern)
    }
}

/// Iterative backtracking match: a single pair of backtrack indices is enough
/// because a later `*` always supersedes an earlier one.
fn glob_match(pattern: &[u8], subject: &[u8]) -> bool {
    let mut px = 0; // pattern index
    let mut sx = 0; // subject index
    let mut next_px = 0; // pattern index to backtrack to
    let mut next_sx = 0; // subject index to backtrack to

    while px < pattern.len() || sx < subject.len() {
        if px < pattern.len() {
            match pattern[px] {
                b'?' if sx < subject.len() => {
                    px += 1;
                    sx += 1;
                    continue;
                }
                b'*' => {
                    // remember where to resume if the rest of the pattern
                    // fails, with the star consuming one more character
                    next_px = px;
                    next_sx = sx + 1;
                    px += 1;
                    continue;
                }
                c if sx < subject.len() && subject[sx] == c => {
                    px += 1;
                    sx += 1;
                    continue;
                }
                _ => {}
            }
        }

        if 0 < next_sx && next_sx <= subject.len() {
            px = next_px;
            sx = next_sx;
            continue;
        }

        return false;
    }

    true
}

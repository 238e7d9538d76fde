//! Chapter heading detection

pub mod detect;
pub mod patterns;

pub use detect::{chapter_ranges, find_chapter_breaks, ChapterBreak, ChapterRange};
pub use patterns::{parse_pattern_list, ChapterPatterns, DEFAULT_PATTERNS};

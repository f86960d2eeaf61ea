//! Static lookup tables used by the mutation techniques.

use lazy_static::lazy_static;
use std::collections::HashMap;

const KEYBOARD_LAYOUT: &[(char, &[char])] = &[
    ('q', &['w', 'a']),
    ('w', &['q', 'e', 's']),
    ('e', &['w', 'r', 'd']),
    ('r', &['e', 't', 'f']),
    ('t', &['r', 'y', 'g']),
    ('y', &['t', 'u', 'h']),
    ('u', &['y', 'i', 'j']),
    ('i', &['u', 'o', 'k']),
    ('o', &['i', 'p', 'l']),
    ('p', &['o', 'l']),
    ('a', &['q', 's', 'z']),
    ('s', &['a', 'd', 'w', 'z', 'x']),
    ('d', &['s', 'f', 'e', 'x', 'c']),
    ('f', &['d', 'g', 'r', 'c', 'v']),
    ('g', &['f', 'h', 't', 'v', 'b']),
    ('h', &['g', 'j', 'y', 'b', 'n']),
    ('j', &['h', 'k', 'u', 'n', 'm']),
    ('k', &['j', 'l', 'i', 'm']),
    ('l', &['k', 'o', 'p']),
    ('z', &['a', 's', 'x']),
    ('x', &['z', 'c', 's', 'd']),
    ('c', &['x', 'v', 'd', 'f']),
    ('v', &['c', 'b', 'f', 'g']),
    ('b', &['v', 'n', 'g', 'h']),
    ('n', &['b', 'm', 'h', 'j']),
    ('m', &['n', 'j', 'k']),
];

// Single characters and their look-alikes. `m` maps to a two-character sequence.
const VISUAL_CHARS: &[(char, &[&str])] = &[
    ('a', &["@", "4"]),
    ('e', &["3"]),
    ('g', &["9"]),
    ('i', &["1", "l", "!"]),
    ('l', &["1", "i", "!"]),
    ('o', &["0"]),
    ('s', &["5", "$"]),
    ('t', &["7"]),
    ('m', &["rn"]),
];

/// Multi-character visual patterns, replaced across the whole label.
pub const VISUAL_PATTERNS: &[(&str, &[&str])] = &[
    ("rn", &["m"]),
    ("cl", &["d"]),
    ("vv", &["w"]),
    ("nn", &["m"]),
];

// Cyrillic and Greek homoglyphs.
const IDN_CHARS: &[(char, &[char])] = &[
    ('a', &['\u{0430}', '\u{03B1}', '\u{0251}']),
    ('e', &['\u{0435}', '\u{03B5}']),
    ('i', &['\u{0456}', '\u{03B9}']),
    ('o', &['\u{043E}', '\u{03BF}', '\u{03C3}']),
    ('p', &['\u{0440}', '\u{03C1}']),
    ('c', &['\u{0441}', '\u{03F2}']),
    ('x', &['\u{0445}', '\u{03C7}']),
    ('y', &['\u{0443}', '\u{03B3}']),
];

pub const SUBDOMAIN_PREFIXES: &[&str] = &[
    "www", "mail", "email", "webmail", "ftp", "cpanel", "whm",
    "admin", "administrator", "root", "api", "secure", "ssl",
    "shop", "store", "payment", "pay", "billing", "account",
    "login", "signin", "auth", "support", "help", "service",
    "mobile", "m", "app", "apps", "download", "updates",
];

/// TLDs always tried when the accepted set contains them.
pub const COMMON_TLDS: &[&str] = &["com", "net", "org", "info", "biz"];

lazy_static! {
    pub static ref KEYBOARD_NEIGHBOURS: HashMap<char, &'static [char]> =
        KEYBOARD_LAYOUT.iter().copied().collect();
    pub static ref VISUAL_LOOKALIKES: HashMap<char, &'static [&'static str]> =
        VISUAL_CHARS.iter().copied().collect();
    pub static ref IDN_HOMOGLYPHS: HashMap<char, &'static [char]> =
        IDN_CHARS.iter().copied().collect();
}

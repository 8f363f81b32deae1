//! The krrg frame, one row per reply.
//!
//! Each glyph `A`..`V` names a palette colour and renders as a solid `#`
//! cell; spaces are left transparent.

use colored::Colorize;

#[rustfmt::skip]
const ROWS: [&str; 32] = [
    "                                                                ",
    "                                          AA                    ",
    "                                    AA  AABBAAAA                ",
    "          AAAAAAAA        AAAAAAAAAABBAABBBBBBBBAAAA            ",
    "        AACCCCDDDDAA  AAAACCCCCCEEFFGGBBBBBBBBBBBBEEAA          ",
    "      AACCCCCCDDDDDDAACCCCCCCCCCEEEEFFGGBBBBHHBBBBEEEEAA        ",
    "      AACCCCCCDDDDCCCCCCCCCCCCCCEEEEEEFFGGHHHHHHFFEEEEAA        ",
    "      AACCCCDDDDDDCCCCCCCCCCCCCCEEEEEEEEFFGGHHHHEEFFEEAA        ",
    "        AADDDDDDCCCCCCCCCCCCCCCCEEEEEEEEEEFFDDEEFFEEAA          ",
    "          AADDDDCCCCCCCCCCCCCCCCEEEEEEEEEEDDDDDDEEEEEEAA        ",
    "        AAIIIIIICCCCCCCCCCCCCCCCEEEEEEEEDDEEDDEEDDEEEEAA        ",
    "        AAIIIIAACCCCCCCCCCCCCCCCEEEEEEEEEEEEDDEEAAEEEEAA        ",
    "        AAIIIIAACCCCCCCCCCCCCCCCEEEEEEEEEEEEDDEEAAEEEEAA        ",
    "        AAIIIIAACCCCCCJJJJJJKKKKKKKKJJJJJJEEEEEEAAEEEEAA        ",
    "        AAIIIIAACCCCCCLLMMLLKKKKKKKKLLMMLLEEEEEEAAEEEEAA        ",
    "        AAIIIIAACCCCCCLLNNNNKKKKKKKKNNNNLLEEEEEEAAEEEEAA        ",
    "        AAIIIIAACCCCCCLLOOOOKKKKKKKKOOOOLLEEEEEEAAEEEEAA        ",
    "        AAIIIIAAAAAAPPQQRRKKKKKKKKKKKKRRQQPPEEEEAAEEEEAA        ",
    "      AAIIIIAA      AACCQQQQQQQQQQQQQQQQEEAA      AAEEEEAA      ",
    "    AAIIIIIIAA      AACCAAAAAASSSSAAAAAAEEAA      AAEEEEAA      ",
    "  AAIIIIIIAA        AACCAAKKKKKKKKKKKKAAEEAA        AAEEEEAA    ",
    "  AAIIIIAA            AAAATTTTSSSSTTTTAAAA          AAEEEEAA    ",
    "AAIIIIAA            AAAAUUSSUUTTTTUUSSUUAAAA          AAEEEEAA  ",
    "AAIIIIAA          AAUUUUAAAASSTTTTSSAAAAUUUUAA        AAEEEEAA  ",
    "AAIIIIAA        AAKKKKUUAAUUUULLLLUUUUAAUUKKKKAA      AAEEEEAA  ",
    "  AAIIIIAA        AAAAAAUUUUUUSSSSUUUUUUAAAAAA      AAEEEEAA    ",
    "    AAIIIIAA        AAUUUUUUTTTTTTTTUUVVUUAA      AAEEEEAA      ",
    "      AAAAIIAA        AAAASSKKAAAAKKSSAAAA      AAEEAAAA        ",
    "          AA          AASSAAKKAAAAKKAASSAA        AA            ",
    "                        AAAAUUAAAAUUAAAA                        ",
    "                          AAUUAAAAUUAA                          ",
    "                          AAAAAAAAAAAA                          ",
];

const PALETTE: [(char, (u8, u8, u8)); 22] = [
    ('A', (234, 44, 134)),
    ('B', (32, 47, 47)),
    ('C', (90, 79, 90)),
    ('D', (29, 20, 30)),
    ('E', (254, 177, 212)),
    ('F', (255, 234, 209)),
    ('G', (253, 213, 234)),
    ('H', (165, 16, 65)),
    ('I', (85, 70, 82)),
    ('J', (73, 37, 58)),
    ('K', (255, 239, 226)),
    ('L', (255, 255, 255)),
    ('M', (105, 14, 98)),
    ('N', (119, 67, 115)),
    ('O', (255, 224, 248)),
    ('P', (192, 24, 98)),
    ('Q', (215, 146, 156)),
    ('R', (255, 202, 207)),
    ('S', (136, 35, 73)),
    ('T', (253, 213, 234)),
    ('U', (67, 52, 60)),
    ('V', (77, 64, 55)),
];

/// Raw row for a sequence number; indices wrap around the table.
pub fn row(seq: usize) -> &'static str {
    ROWS[seq % ROWS.len()]
}

pub fn colour_of(glyph: char) -> Option<(u8, u8, u8)> {
    PALETTE
        .iter()
        .find(|(g, _)| *g == glyph)
        .map(|(_, rgb)| *rgb)
}

pub fn render_row(seq: usize) -> String {
    let mut line = String::new();
    for glyph in row(seq).chars() {
        match colour_of(glyph) {
            Some((r, g, b)) => {
                let cell = "#".truecolor(r, g, b).on_truecolor(r, g, b);
                line.push_str(&cell.to_string());
            }
            None => line.push(glyph),
        }
    }
    line
}

//! Keyboard adjacency and confusable glyph tables.

use std::collections::HashMap;

use lazy_static::lazy_static;

fn layout(keys: &[(char, &'static str)]) -> HashMap<char, &'static str> {
    keys.iter().copied().collect()
}

lazy_static! {
    /// Keys physically adjacent to each key, per layout: English QWERTY,
    /// German QWERTZ, Spanish, French AZERTY (in that order).
    pub static ref KEYBOARD_LAYOUTS: [HashMap<char, &'static str>; 4] = [
        layout(&[
            ('1', "2q"), ('2', "13wq"), ('3', "24ew"), ('4', "35re"), ('5', "46tr"),
            ('6', "57yt"), ('7', "68uy"), ('8', "79iu"), ('9', "80oi"), ('0', "9po"),
            ('q', "12wa"), ('w', "3esaq2"), ('e', "4rdsw3"), ('r', "5tfde4"), ('t', "6ygfr5"),
            ('y', "7uhgt6"), ('u', "8ijhy7"), ('i', "9okju8"), ('o', "0plki9"), ('p', "lo0"),
            ('a', "qwsz"), ('s', "edxzaw"), ('d', "rfcxse"), ('f', "tgvcdr"), ('g', "yhbvft"),
            ('h', "ujnbgy"), ('j', "ikmnhu"), ('k', "olmji"), ('l', "kop"),
            ('z', "asx"), ('x', "zsdc"), ('c', "xdfv"), ('v', "cfgb"), ('b', "vghn"),
            ('n', "bhjm"), ('m', "njk"),
        ]),
        layout(&[
            ('1', "2q"), ('2', "13wq"), ('3', "24ew"), ('4', "35re"), ('5', "46tr"),
            ('6', "57zt"), ('7', "68uz"), ('8', "79iu"), ('9', "80oi"), ('0', "9po"),
            ('q', "12wa"), ('w', "3esaq2"), ('e', "4rdsw3"), ('r', "5tfde4"), ('t', "6zgfr5"),
            ('z', "7uhgt6"), ('u', "8ijhz7"), ('i', "9okju8"), ('o', "0plki9"), ('p', "üölo0"),
            ('ü', "äöp"), ('a', "qwsy"), ('s', "edxyaw"), ('d', "rfcxse"), ('f', "tgvcdr"),
            ('g', "zhbvft"), ('h', "ujnbgz"), ('j', "ikmnhu"), ('k', "olmji"), ('l', "köop"),
            ('ö', "üäpl"), ('ä', "üö"),
            ('y', "asx"), ('x', "ysdc"), ('c', "xdfv"), ('v', "cfgb"), ('b', "vghn"),
            ('n', "bhjm"), ('m', "njk"),
        ]),
        layout(&[
            ('1', "2q"), ('2', "13wq"), ('3', "24ew"), ('4', "35re"), ('5', "46tr"),
            ('6', "57yt"), ('7', "68uy"), ('8', "79iu"), ('9', "80oi"), ('0', "9po"),
            ('q', "12wa"), ('w', "3esaq2"), ('e', "4rdsw3"), ('r', "5tfde4"), ('t', "6ygfr5"),
            ('y', "7uhgt6"), ('u', "8ijhy7"), ('i', "9okju8"), ('o', "0plki9"), ('p', "ñlo0"),
            ('a', "qwsz"), ('s', "edxzaw"), ('d', "rfcxse"), ('f', "tgvcdr"), ('g', "yhbvft"),
            ('h', "ujnbgy"), ('j', "ikmnhu"), ('k', "olmji"), ('l', "ñkop"), ('ñ', "plk"),
            ('z', "asx"), ('x', "zsdc"), ('c', "xdfv"), ('v', "cfgb"), ('b', "vghn"),
            ('n', "bhjm"), ('m', "njk"),
        ]),
        layout(&[
            ('1', "2a"), ('2', "13za"), ('3', "24ez"), ('4', "35re"), ('5', "46tr"),
            ('6', "57yt"), ('7', "68uy"), ('8', "79iu"), ('9', "80oi"), ('0', "9po"),
            ('a', "é2zq1"), ('z', "3esqa2"), ('e', "4rdsz3"), ('r', "5tfde4"), ('t', "6-ygfr5"),
            ('y', "7èuhgt-"), ('u', "8ijhyè"), ('i', "9çokju8"), ('o', "0àplki9"), ('p', "mo0à"),
            ('q', "azsw"), ('s', "zedxwq"), ('d', "erfcxs"), ('f', "rtgvcd"), ('g', "tyhbvf"),
            ('h', "yujnbg"), ('j', "uikmnh"), ('k', "iolmj"), ('l', "opmk"), ('m', "plù"),
            ('w', "qsx"), ('x', "wsdc"), ('c', "xdfv"), ('v', "cfgb"), ('b', "vghn"),
            ('n', "bhj"),
        ]),
    ];

    /// Latin, Cyrillic, Greek and digit look-alikes per letter.
    pub static ref GLYPHS: HashMap<char, &'static [char]> = {
        let glyphs: [(char, &'static [char]); 26] = [
            ('a', &['à', 'á', 'â', 'ã', 'ä', 'å', 'ɑ', 'а', 'ạ', 'ǎ', 'ă', 'ȧ', 'α', 'ａ']),
            ('b', &['d', 'ʙ', 'Ь', 'ɓ', 'Б', 'ß', 'β', 'ᛒ']),
            ('c', &['ϲ', 'с', 'ƈ', 'ċ', 'ć', 'ç', 'ｃ']),
            ('d', &['b', 'ԁ', 'ժ', 'ɗ', 'đ']),
            ('e', &['é', 'ê', 'ë', 'ē', 'ĕ', 'ě', 'ė', 'е', 'ẹ', 'ę', 'є', 'ϵ', 'ҽ']),
            ('f', &['Ϝ', 'ƒ', 'Ғ']),
            ('g', &['q', 'ɢ', 'ɡ', 'Ԍ', 'ġ', 'ğ', 'ց', 'ǵ', 'ģ']),
            ('h', &['һ', 'հ', 'Ꮒ', 'н']),
            ('i', &['1', 'l', 'Ꭵ', 'í', 'ï', 'ı', 'ɩ', 'ι', 'ꙇ', 'ǐ', 'ĭ']),
            ('j', &['ј', 'ʝ', 'ϳ', 'ɉ']),
            ('k', &['κ', 'ⲕ']),
            ('l', &['1', 'i', 'ɫ', 'ł']),
            ('m', &['n', 'ṃ', 'ᴍ', 'м', 'ɱ']),
            ('n', &['m', 'r', 'ń']),
            ('o', &['0', 'Ο', 'ο', 'О', 'о', 'Օ', 'ȯ', 'ọ', 'ỏ', 'ơ', 'ó', 'ö', 'ӧ', 'ｏ']),
            ('p', &['ρ', 'р', 'ƿ', 'Ϸ', 'Þ']),
            ('q', &['g', 'զ', 'ԛ', 'գ', 'ʠ']),
            ('r', &['ʀ', 'Г', 'ᴦ', 'ɼ', 'ɽ']),
            ('s', &['Ⴝ', 'Ꮪ', 'ʂ', 'ś', 'ѕ']),
            ('t', &['τ', 'т', 'ţ']),
            ('u', &['μ', 'υ', 'Ս', 'ս', 'ц', 'ᴜ', 'ǔ', 'ŭ']),
            ('v', &['ѵ', 'ν']),
            ('w', &['ѡ', 'ա', 'ԝ']),
            ('x', &['х', 'ҳ']),
            ('y', &['ʏ', 'γ', 'у', 'Ү', 'ý']),
            ('z', &['ʐ', 'ż', 'ź', 'ᴢ']),
        ];
        glyphs.into_iter().collect()
    };
}

/// Adjacent keys for `c` on every layout, in layout order.
pub fn adjacent_keys(c: char) -> impl Iterator<Item = char> {
    KEYBOARD_LAYOUTS
        .iter()
        .filter_map(move |layout| layout.get(&c).copied())
        .flat_map(|keys| keys.chars())
}

/// Confusable glyphs for `c`, empty when the table has none.
pub fn glyphs_for(c: char) -> &'static [char] {
    GLYPHS.get(&c).copied().unwrap_or(&[])
}

pub(crate) const LANES: usize = 4;

/// A 1-based playable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lane(u8);

impl Lane {
    pub(crate) fn new(lane: u8) -> Option<Lane> {
        (1..=LANES as u8).contains(&lane).then_some(Lane(lane))
    }

    pub(crate) fn get(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Tap(Lane),
    HoldStart(Lane),
    HoldEnd(Lane),
    SubdivisionStart,
    SubdivisionEnd,
    BindStart,
    BindEnd,
}

pub(crate) fn split_rows(block: &str) -> impl Iterator<Item = &str> {
    block.split(',')
}

pub(crate) fn tokenize(row: &str) -> impl Iterator<Item = Token> + '_ {
    row.chars().filter_map(classify)
}

pub(crate) fn classify(ch: char) -> Option<Token> {
    match ch {
        // 5-8 are attack notes; they land on the same four lanes
        '1'..='8' => {
            let digit = ch as u8 - b'0';
            Lane::new((digit - 1) % LANES as u8 + 1).map(Token::Tap)
        }
        'a'..='d' => Lane::new(ch as u8 - b'a' + 1).map(Token::HoldStart),
        'e'..='h' => Lane::new(ch as u8 - b'e' + 1).map(Token::HoldEnd),
        '(' => Some(Token::SubdivisionStart),
        ')' => Some(Token::SubdivisionEnd),
        '[' => Some(Token::BindStart),
        ']' => Some(Token::BindEnd),
        _ => None,
    }
}

use super::ParseError;
use nom::branch::alt;
use nom::bytes::complete::take;
use nom::character::complete::char as exact;
use nom::combinator::map;
use nom::sequence::preceded;
use nom::IResult;

/// The classification of the current lexeme. Metacharacter kinds only apply
/// outside quote mode and to unescaped characters; everything else is
/// [Token::Literal].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Eoi,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Caret,
    Dash,
    Dot,
    Dollar,
    Literal,
    Pipe,
    Plus,
    Question,
    Star,
}

impl Token {
    fn classify(c: u8) -> Token {
        match c {
            b'$' => Token::Dollar,
            b'(' => Token::LeftParen,
            b')' => Token::RightParen,
            b'*' => Token::Star,
            b'+' => Token::Plus,
            b'-' => Token::Dash,
            b'.' => Token::Dot,
            b'?' => Token::Question,
            b'[' => Token::LeftBracket,
            b']' => Token::RightBracket,
            b'^' => Token::Caret,
            b'|' => Token::Pipe,
            _ => Token::Literal,
        }
    }
}

fn one_char(s: &str) -> char {
    s.chars().next().expect("take(1) yields one char")
}

fn escaped_char(input: &str) -> IResult<&str, char> {
    preceded(
        exact('\\'),
        map(take(1usize), |s: &str| match s {
            "t" => '\t',
            "n" => '\n',
            "r" => '\r',
            other => one_char(other),
        }),
    )(input)
}

fn raw_char(input: &str) -> IResult<&str, char> {
    map(take(1usize), one_char)(input)
}

/// The token scanner. One token of lookahead: [Lexer::advance] reads the next
/// token, and [Lexer::current_token]/[Lexer::current_lexeme] peek at it.
pub(crate) struct Lexer<'a> {
    rest: &'a str,
    source_len: usize,
    token: Token,
    lexeme: u8,
    token_offset: usize,
    in_quote: bool,
    quote_opened: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Lexer {
            rest: source,
            source_len: source.len(),
            token: Token::Eoi,
            lexeme: 0,
            token_offset: 0,
            in_quote: false,
            quote_opened: 0,
        }
    }

    /// Byte offset just past everything consumed so far.
    fn offset(&self) -> usize {
        self.source_len - self.rest.len()
    }

    pub(crate) fn current_token(&self) -> Token {
        self.token
    }

    pub(crate) fn current_lexeme(&self) -> u8 {
        self.lexeme
    }

    /// Byte offset at which the current token started.
    pub(crate) fn token_offset(&self) -> usize {
        self.token_offset
    }

    /// Reads the next token. Idempotent at end of input, where the token is
    /// [Token::Eoi] with lexeme `\0`. A `"` toggles quote mode and is
    /// consumed without producing a token of its own.
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        self.token_offset = self.offset();
        if self.rest.is_empty() {
            return self.end_of_input();
        }
        if let Some(stripped) = self.rest.strip_prefix('"') {
            if !self.in_quote {
                self.quote_opened = self.token_offset;
            }
            self.in_quote = !self.in_quote;
            self.rest = stripped;
            self.token_offset = self.offset();
            if self.rest.is_empty() {
                return self.end_of_input();
            }
        }
        let saw_escape = self.rest.starts_with('\\');
        let lexeme = if self.in_quote {
            self.quoted_char()?
        } else {
            self.plain_char()?
        };
        self.lexeme = lexeme;
        self.token = if self.in_quote || saw_escape {
            Token::Literal
        } else {
            Token::classify(lexeme)
        };
        Ok(self.token)
    }

    fn end_of_input(&mut self) -> Result<Token, ParseError> {
        if self.in_quote {
            return Err(ParseError::UnterminatedQuote {
                offset: self.quote_opened,
            });
        }
        self.token = Token::Eoi;
        self.lexeme = 0;
        Ok(self.token)
    }

    fn plain_char(&mut self) -> Result<u8, ParseError> {
        let (rest, c) =
            alt((escaped_char, raw_char))(self.rest).expect("nonempty input yields a char");
        let lexeme = self.check_ascii(c)?;
        self.rest = rest;
        Ok(lexeme)
    }

    fn quoted_char(&mut self) -> Result<u8, ParseError> {
        // Only `\"` is special in quote mode; a backslash before anything
        // else stays a literal backslash.
        if let Some(stripped) = self.rest.strip_prefix("\\\"") {
            self.rest = stripped;
            return Ok(b'"');
        }
        let (rest, c) = raw_char(self.rest).expect("nonempty input yields a char");
        let lexeme = self.check_ascii(c)?;
        self.rest = rest;
        Ok(lexeme)
    }

    fn check_ascii(&self, c: char) -> Result<u8, ParseError> {
        let code = c as u32;
        if (1..=126).contains(&code) {
            Ok(code as u8)
        } else {
            Err(ParseError::UnsupportedByte {
                code,
                offset: self.token_offset,
            })
        }
    }
}

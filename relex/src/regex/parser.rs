use super::lexer::{Lexer, Token};
use super::ParseError;
use crate::bitset::Bitset;
use crate::nfa::{Anchor, Edge, Nfa, NfaArena};

/// Compiles a regex source string into an NFA by the Thompson construction.
///
/// The grammar is parsed by recursive descent, and every production returns
/// a fragment as a `(start, end)` pair of arena indices which the caller
/// stitches into the surrounding machine:
///
/// ```text
/// machine   := rule ( rule )* EOI
/// rule      := [ '^' ] expr [ '$' ]
/// expr      := cat_expr ( '|' cat_expr )*
/// cat_expr  := factor ( factor )*
/// factor    := term [ '*' | '+' | '?' ]
/// term      := '(' expr ')' | '.' | '[' class ']' | literal
/// ```
pub fn parse(source: &str) -> Result<Nfa, ParseError> {
    Parser {
        lexer: Lexer::new(source),
        arena: NfaArena::new(),
    }
    .machine()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    arena: NfaArena,
}

fn line_enders() -> Bitset {
    let mut set = Bitset::new();
    set.set(b'\n' as usize);
    set.set(b'\r' as usize);
    set
}

impl<'a> Parser<'a> {
    /// Parses all rules and chains them through a spine of epsilon splits,
    /// so the resulting machine may accept via any rule.
    fn machine(mut self) -> Result<Nfa, ParseError> {
        let start = self.arena.alloc();
        let mut spine = start;
        self.lexer.advance()?;
        let rule = self.rule()?;
        self.arena.node_mut(spine).next[0] = Some(rule);
        while self.lexer.current_token() != Token::Eoi {
            // Rules stop consuming at `)`, so one left over here was never
            // opened and would stall the loop
            if self.lexer.current_token() == Token::RightParen {
                return Err(ParseError::UnmatchedRightParen {
                    offset: self.lexer.token_offset(),
                });
            }
            let link = self.arena.alloc();
            self.arena.node_mut(spine).next[1] = Some(link);
            spine = link;
            let rule = self.rule()?;
            self.arena.node_mut(spine).next[0] = Some(rule);
        }
        Ok(self.arena.into_nfa(start))
    }

    fn rule(&mut self) -> Result<usize, ParseError> {
        let mut anchor = Anchor::NONE;
        let (start, mut end) = if self.lexer.current_token() == Token::Caret {
            // A line-anchored rule starts by consuming the newline that
            // ended the previous line.
            let head = self.arena.alloc();
            self.arena.node_mut(head).edge = Edge::Char(b'\n');
            anchor |= Anchor::BOL;
            self.lexer.advance()?;
            let (expr_start, expr_end) = self.expr()?;
            self.arena.node_mut(head).next[0] = Some(expr_start);
            (head, expr_end)
        } else {
            self.expr()?
        };
        if self.lexer.current_token() == Token::Dollar {
            self.lexer.advance()?;
            let terminal = self.arena.alloc();
            let tail = self.arena.node_mut(end);
            tail.edge = Edge::Class {
                set: line_enders(),
                complement: false,
            };
            tail.next[0] = Some(terminal);
            end = terminal;
            anchor |= Anchor::EOL;
        }
        self.arena.node_mut(end).anchor = anchor;
        Ok(start)
    }

    fn expr(&mut self) -> Result<(usize, usize), ParseError> {
        let (mut start, mut end) = self.cat_expr()?;
        while self.lexer.current_token() == Token::Pipe {
            self.lexer.advance()?;
            let (alt_start, alt_end) = self.cat_expr()?;
            let split = self.arena.alloc();
            self.arena.node_mut(split).next = [Some(start), Some(alt_start)];
            let join = self.arena.alloc();
            self.arena.node_mut(end).next[0] = Some(join);
            self.arena.node_mut(alt_end).next[0] = Some(join);
            start = split;
            end = join;
        }
        Ok((start, end))
    }

    fn cat_expr(&mut self) -> Result<(usize, usize), ParseError> {
        if !self.first_in_cat()? {
            // An empty branch (`a|`, `()`) is a single epsilon hop
            let start = self.arena.alloc();
            let end = self.arena.alloc();
            self.arena.node_mut(start).next[0] = Some(end);
            return Ok((start, end));
        }
        let (start, mut end) = self.factor()?;
        while self.first_in_cat()? {
            let (next_start, next_end) = self.factor()?;
            // The previous end takes over the next start's content, which
            // joins the fragments without an extra epsilon hop.
            self.arena.fuse(end, next_start);
            end = next_end;
        }
        Ok((start, end))
    }

    fn first_in_cat(&self) -> Result<bool, ParseError> {
        let offset = self.lexer.token_offset();
        match self.lexer.current_token() {
            Token::RightParen | Token::Dollar | Token::Pipe | Token::Eoi => Ok(false),
            Token::Star => Err(ParseError::MisplacedPostfix { symbol: '*', offset }),
            Token::Plus => Err(ParseError::MisplacedPostfix { symbol: '+', offset }),
            Token::Question => Err(ParseError::MisplacedPostfix { symbol: '?', offset }),
            Token::RightBracket => Err(ParseError::StrayRightBracket { offset }),
            Token::Caret => Err(ParseError::StrayCaret { offset }),
            _ => Ok(true),
        }
    }

    fn factor(&mut self) -> Result<(usize, usize), ParseError> {
        let (mut start, mut end) = self.term()?;
        let token = self.lexer.current_token();
        if matches!(token, Token::Star | Token::Plus | Token::Question) {
            let outer_start = self.arena.alloc();
            let outer_end = self.arena.alloc();
            self.arena.node_mut(outer_start).next[0] = Some(start);
            self.arena.node_mut(end).next[0] = Some(outer_end);
            if matches!(token, Token::Star | Token::Question) {
                // Bypass: the loop body may be skipped
                self.arena.node_mut(outer_start).next[1] = Some(outer_end);
            }
            if matches!(token, Token::Star | Token::Plus) {
                // Back edge: the loop body may repeat
                self.arena.node_mut(end).next[1] = Some(start);
            }
            start = outer_start;
            end = outer_end;
            self.lexer.advance()?;
        }
        Ok((start, end))
    }

    fn term(&mut self) -> Result<(usize, usize), ParseError> {
        if self.lexer.current_token() == Token::LeftParen {
            self.lexer.advance()?;
            let fragment = self.expr()?;
            if self.lexer.current_token() != Token::RightParen {
                return Err(ParseError::MissingRightParen {
                    offset: self.lexer.token_offset(),
                });
            }
            self.lexer.advance()?;
            return Ok(fragment);
        }

        let start = self.arena.alloc();
        let end = self.arena.alloc();
        self.arena.node_mut(start).next[0] = Some(end);
        match self.lexer.current_token() {
            Token::Dot => {
                self.arena.node_mut(start).edge = Edge::Class {
                    set: line_enders(),
                    complement: true,
                };
                self.lexer.advance()?;
            }
            Token::LeftBracket => {
                let edge = self.class()?;
                self.arena.node_mut(start).edge = edge;
            }
            _ => {
                self.arena.node_mut(start).edge = Edge::Char(self.lexer.current_lexeme());
                self.lexer.advance()?;
            }
        }
        Ok((start, end))
    }

    fn class(&mut self) -> Result<Edge, ParseError> {
        let opened_at = self.lexer.token_offset();
        self.lexer.advance()?;
        let mut set = Bitset::new();
        let mut complement = false;
        if self.lexer.current_token() == Token::Caret {
            self.lexer.advance()?;
            set.union_with(&line_enders());
            complement = true;
        }
        if self.lexer.current_token() == Token::RightBracket {
            // An empty class historically stands for the control characters
            for code in 0..=b' ' {
                set.set(code as usize);
            }
        } else {
            self.class_body(&mut set)?;
        }
        if self.lexer.current_token() != Token::RightBracket {
            return Err(ParseError::UnterminatedClass { offset: opened_at });
        }
        self.lexer.advance()?;
        Ok(Edge::Class { set, complement })
    }

    fn class_body(&mut self, set: &mut Bitset) -> Result<(), ParseError> {
        let mut range_start: Option<u8> = None;
        while !matches!(
            self.lexer.current_token(),
            Token::Eoi | Token::RightBracket
        ) {
            if self.lexer.current_token() != Token::Dash {
                range_start = Some(self.lexer.current_lexeme());
                set.set(self.lexer.current_lexeme() as usize);
            } else {
                self.lexer.advance()?;
                if matches!(
                    self.lexer.current_token(),
                    Token::Eoi | Token::RightBracket
                ) {
                    // `[a-]`: a dash with no right operand is a literal
                    set.set(b'-' as usize);
                    break;
                }
                match range_start.take() {
                    Some(first) => {
                        for code in first..=self.lexer.current_lexeme() {
                            set.set(code as usize);
                        }
                    }
                    None => {
                        // `[-x]`: a dash with no left operand is a literal
                        set.set(b'-' as usize);
                        set.set(self.lexer.current_lexeme() as usize);
                    }
                }
            }
            self.lexer.advance()?;
        }
        Ok(())
    }
}

use calchart_ast::{DefinedValue, Function, Point, Procedure, Span, Value, Variable};

use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Parses one continuity text into its ordered `Procedure` list.
///
/// Stateless: takes the source text and returns a fresh AST every call, per
/// the "global parser state" redesign note — there is no module-level lexer
/// buffer to reset between calls.
pub fn parse(source: &str) -> Result<Vec<Procedure>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token();
        let is_eof = matches!(tok.kind, TokenKind::Eof);
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Parser { tokens, pos: 0 }.parse_procedures()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn join(a: Span, b: Span) -> Span {
    let end_a = a.column + a.length;
    let end_b = b.column + b.length;
    let end = end_a.max(end_b);
    Span::new(a.line, a.column, end.saturating_sub(a.column))
}

impl Parser {
    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn cur_span(&self) -> Span {
        self.cur().span
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn ident_text(&self) -> Option<&str> {
        match &self.cur().kind {
            TokenKind::Ident(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<Span, ParseError> {
        match self.ident_text() {
            Some(text) if text.eq_ignore_ascii_case(expected) => {
                Ok(self.bump().span)
            }
            _ => Err(self.unexpected(&format!("keyword `{expected}`"))),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span, ParseError> {
        if self.cur().kind == kind {
            Ok(self.bump().span)
        } else {
            Err(self.unexpected(&format!("{kind:?}")))
        }
    }

    fn unexpected(&self, wanted: &str) -> ParseError {
        ParseError::new(
            self.cur_span(),
            format!("expected {wanted}, found {:?}", self.cur().kind),
        )
    }

    /// True if the current token is the identifier spelling of a `Point`
    /// primary (`P`, `SP`, `NP`, `R<n>`), as opposed to a `Value` primary.
    /// Point and Value identifier spellings are disjoint sets, so a single
    /// token of lookahead is enough to disambiguate `FOUNTAIN`'s optional
    /// step-size arguments.
    fn next_is_point(&self) -> bool {
        matches!(self.point_kind(), Some(_))
    }

    fn point_kind(&self) -> Option<PointKind> {
        let text = self.ident_text()?;
        let upper = text.to_ascii_uppercase();
        match upper.as_str() {
            "P" => Some(PointKind::Current),
            "SP" => Some(PointKind::Start),
            "NP" => Some(PointKind::Next),
            _ => {
                if let Some(rest) = upper.strip_prefix('R') {
                    if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                        return rest.parse::<u32>().ok().map(PointKind::Ref);
                    }
                }
                None
            }
        }
    }

    /// True if the current token begins a new top-level statement (a `Set`
    /// assignment or a procedure keyword) rather than an optional trailing
    /// argument — used to disambiguate `MARCH`'s optional facing argument.
    fn starts_new_statement(&self) -> bool {
        if matches!(self.cur().kind, TokenKind::Eof) {
            return true;
        }
        let Some(text) = self.ident_text() else {
            return false;
        };
        if PROCEDURE_KEYWORDS.iter().any(|kw| text.eq_ignore_ascii_case(kw)) {
            return true;
        }
        matches!(self.peek_kind(1), Some(TokenKind::Equals))
    }

    fn peek_kind(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn parse_procedures(&mut self) -> Result<Vec<Procedure>, ParseError> {
        let mut procs = Vec::new();
        while !matches!(self.cur().kind, TokenKind::Eof) {
            procs.push(self.parse_procedure()?);
        }
        Ok(procs)
    }

    fn parse_procedure(&mut self) -> Result<Procedure, ParseError> {
        if matches!(self.peek_kind(1), Some(TokenKind::Equals)) {
            return self.parse_set();
        }
        let Some(text) = self.ident_text().map(str::to_ascii_uppercase) else {
            return Err(self.unexpected("a procedure keyword"));
        };
        match text.as_str() {
            "BLAM" => {
                let span = self.bump().span;
                Ok(Procedure::Blam { span })
            }
            "CM" => self.parse_cm(),
            "DMCM" => self.parse_dmcm(),
            "DMHS" => self.parse_one_point("DMHS", |point, span| Procedure::Dmhs { point, span }),
            "EVEN" => self.parse_even(),
            "EWNS" => self.parse_one_point("EWNS", |point, span| Procedure::Ewns { point, span }),
            "FOUNTAIN" => self.parse_fountain(),
            "FM" => self.parse_fm(),
            "FMTO" => self.parse_one_point("FMTO", |point, span| Procedure::Fmto { point, span }),
            "GRID" => self.parse_grid(),
            "HSCM" => self.parse_hscm(),
            "HSDM" => self.parse_one_point("HSDM", |point, span| Procedure::Hsdm { point, span }),
            "MAGIC" => self.parse_one_point("MAGIC", |point, span| Procedure::Magic { point, span }),
            "MARCH" => self.parse_march(),
            "MT" => self.parse_mt(),
            "MTRM" => self.parse_mtrm(),
            "NSEW" => self.parse_one_point("NSEW", |point, span| Procedure::Nsew { point, span }),
            "ROTATE" => self.parse_rotate(),
            _ => Err(self.unexpected("a procedure keyword")),
        }
    }

    fn parse_set(&mut self) -> Result<Procedure, ParseError> {
        let var_span = self.cur_span();
        let var = self.parse_variable_ident()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_value()?;
        let span = join(var_span, value.span());
        Ok(Procedure::Set { var, value, span })
    }

    fn parse_variable_ident(&mut self) -> Result<Variable, ParseError> {
        let text = self
            .ident_text()
            .ok_or_else(|| self.unexpected("a continuity variable"))?
            .to_ascii_uppercase();
        let var = match text.as_str() {
            "A" => Variable::A,
            "B" => Variable::B,
            "C" => Variable::C,
            "D" => Variable::D,
            "X" => Variable::X,
            "Y" => Variable::Y,
            "Z" => Variable::Z,
            "DOF" => Variable::Dof,
            "DOH" => Variable::Doh,
            _ => return Err(self.unexpected("a continuity variable")),
        };
        self.bump();
        Ok(var)
    }

    fn parse_one_point(
        &mut self,
        keyword: &str,
        build: impl FnOnce(Point, Span) -> Procedure,
    ) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident(keyword)?;
        let point = self.parse_point()?;
        let span = join(kw_span, point.span());
        Ok(build(point, span))
    }

    fn parse_cm(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("CM")?;
        let pnt1 = self.parse_point()?;
        let pnt2 = self.parse_point()?;
        let steps = self.parse_value()?;
        let dir1 = self.parse_value()?;
        let dir2 = self.parse_value()?;
        let beats = self.parse_value()?;
        let span = join(kw_span, beats.span());
        Ok(Procedure::Cm {
            pnt1,
            pnt2,
            steps,
            dir1,
            dir2,
            beats,
            span,
        })
    }

    fn parse_dmcm(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("DMCM")?;
        let pnt1 = self.parse_point()?;
        let pnt2 = self.parse_point()?;
        let beats = self.parse_value()?;
        let span = join(kw_span, beats.span());
        Ok(Procedure::Dmcm { pnt1, pnt2, beats, span })
    }

    fn parse_hscm(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("HSCM")?;
        let pnt1 = self.parse_point()?;
        let pnt2 = self.parse_point()?;
        let beats = self.parse_value()?;
        let span = join(kw_span, beats.span());
        Ok(Procedure::Hscm { pnt1, pnt2, beats, span })
    }

    fn parse_even(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("EVEN")?;
        let beats = self.parse_value()?;
        let point = self.parse_point()?;
        let span = join(kw_span, point.span());
        Ok(Procedure::Even { beats, point, span })
    }

    fn parse_fountain(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("FOUNTAIN")?;
        let dir1 = self.parse_value()?;
        let dir2 = self.parse_value()?;
        let (step_size1, step_size2) = if self.next_is_point() {
            (None, None)
        } else {
            (Some(self.parse_value()?), Some(self.parse_value()?))
        };
        let point = self.parse_point()?;
        let span = join(kw_span, point.span());
        Ok(Procedure::Fountain {
            dir1,
            dir2,
            step_size1,
            step_size2,
            point,
            span,
        })
    }

    fn parse_fm(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("FM")?;
        let beats = self.parse_value()?;
        let dir = self.parse_value()?;
        let span = join(kw_span, dir.span());
        Ok(Procedure::Fm { beats, dir, span })
    }

    fn parse_grid(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("GRID")?;
        let grid = self.parse_value()?;
        let span = join(kw_span, grid.span());
        Ok(Procedure::Grid { grid, span })
    }

    fn parse_march(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("MARCH")?;
        let step_size = self.parse_value()?;
        let steps = self.parse_value()?;
        let dir = self.parse_value()?;
        let mut end_span = dir.span();
        let face = if self.starts_new_statement() {
            None
        } else {
            let value = self.parse_value()?;
            end_span = value.span();
            Some(value)
        };
        let span = join(kw_span, end_span);
        Ok(Procedure::March {
            step_size,
            steps,
            dir,
            face,
            span,
        })
    }

    fn parse_mt(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("MT")?;
        let beats = self.parse_value()?;
        let dir = self.parse_value()?;
        let span = join(kw_span, dir.span());
        Ok(Procedure::Mt { beats, dir, span })
    }

    fn parse_mtrm(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("MTRM")?;
        let dir = self.parse_value()?;
        let span = join(kw_span, dir.span());
        Ok(Procedure::Mtrm { dir, span })
    }

    fn parse_rotate(&mut self) -> Result<Procedure, ParseError> {
        let kw_span = self.expect_ident("ROTATE")?;
        let angle = self.parse_value()?;
        let beats = self.parse_value()?;
        let point = self.parse_point()?;
        let span = join(kw_span, point.span());
        Ok(Procedure::Rotate {
            angle,
            beats,
            point,
            span,
        })
    }

    fn parse_point(&mut self) -> Result<Point, ParseError> {
        let span = self.cur_span();
        match self.point_kind() {
            Some(PointKind::Current) => {
                self.bump();
                Ok(Point::CurrentPoint { span })
            }
            Some(PointKind::Start) => {
                self.bump();
                Ok(Point::StartPoint { span })
            }
            Some(PointKind::Next) => {
                self.bump();
                Ok(Point::NextPoint { span })
            }
            Some(PointKind::Ref(n)) => {
                self.bump();
                Ok(Point::RefPoint {
                    index: (n - 1) as u8,
                    span,
                })
            }
            None => Err(self.unexpected("a point (P, SP, NP, or R<n>)")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        self.parse_add_sub()
    }

    fn parse_add_sub(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.parse_mul_div()?;
        loop {
            match self.cur().kind {
                TokenKind::Plus => {
                    self.bump();
                    let rhs = self.parse_mul_div()?;
                    lhs = Value::Add(Box::new(lhs), Box::new(rhs));
                }
                TokenKind::Minus => {
                    self.bump();
                    let rhs = self.parse_mul_div()?;
                    lhs = Value::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_mul_div(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.cur().kind {
                TokenKind::Star => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    lhs = Value::Mult(Box::new(lhs), Box::new(rhs));
                }
                TokenKind::Slash => {
                    self.bump();
                    let rhs = self.parse_unary()?;
                    lhs = Value::Div(Box::new(lhs), Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Value, ParseError> {
        if matches!(self.cur().kind, TokenKind::Minus) {
            let span = self.bump().span;
            let operand = self.parse_unary()?;
            let full = join(span, operand.span());
            return Ok(Value::Neg(Box::new(operand), full));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Value, ParseError> {
        let span = self.cur_span();
        match self.cur().kind.clone() {
            TokenKind::Number(n) => {
                self.bump();
                Ok(Value::Literal { value: n, span })
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_value()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(text) => self.parse_ident_value(&text, span),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_ident_value(&mut self, text: &str, span: Span) -> Result<Value, ParseError> {
        let upper = text.to_ascii_uppercase();
        if upper == "REM" {
            self.bump();
            return Ok(Value::Rem { span });
        }
        if let Some(defined) = defined_value_for(&upper) {
            self.bump();
            return Ok(Value::Defined { value: defined, span });
        }
        if let Some(var) = variable_for(&upper) {
            self.bump();
            return Ok(Value::Variable { var, span });
        }
        if FUNCTION_KEYWORDS.contains(&upper.as_str()) {
            return self.parse_function(&upper, span).map(|f| Value::Function(Box::new(f)));
        }
        Err(self.unexpected("a value"))
    }

    fn parse_function(&mut self, name: &str, kw_span: Span) -> Result<Function, ParseError> {
        self.bump(); // the function keyword
        self.expect(TokenKind::LParen)?;
        let func = match name {
            "DIR" => {
                let point = self.parse_point()?;
                Function::Dir { point, span: kw_span }
            }
            "DIRFROM" => {
                let from = self.parse_point()?;
                let to = self.parse_point()?;
                Function::DirFrom { from, to, span: kw_span }
            }
            "DIST" => {
                let point = self.parse_point()?;
                Function::Dist { point, span: kw_span }
            }
            "DISTFROM" => {
                let from = self.parse_point()?;
                let to = self.parse_point()?;
                Function::DistFrom { from, to, span: kw_span }
            }
            "EITHER" => {
                let dir1 = self.parse_value()?;
                let dir2 = self.parse_value()?;
                let point = self.parse_point()?;
                Function::Either {
                    dir1,
                    dir2,
                    point,
                    span: kw_span,
                }
            }
            "OPP" => {
                let dir = self.parse_value()?;
                Function::Opp { dir, span: kw_span }
            }
            "STEP" => {
                let beats = self.parse_value()?;
                let blocksize = self.parse_value()?;
                let point = self.parse_point()?;
                Function::Step {
                    beats,
                    blocksize,
                    point,
                    span: kw_span,
                }
            }
            _ => return Err(self.unexpected("a function name")),
        };
        let close = self.expect(TokenKind::RParen)?;
        // Re-span to cover the whole call; individual variants keep `kw_span`
        // as their primary span (callers mostly care about where the call
        // starts), but we validate the closing paren was actually found.
        let _ = close;
        Ok(func)
    }
}

enum PointKind {
    Current,
    Start,
    Next,
    Ref(u32),
}

const PROCEDURE_KEYWORDS: &[&str] = &[
    "BLAM", "CM", "DMCM", "DMHS", "EVEN", "EWNS", "FOUNTAIN", "FM", "FMTO", "GRID", "HSCM",
    "HSDM", "MAGIC", "MARCH", "MT", "MTRM", "NSEW", "ROTATE",
];

const FUNCTION_KEYWORDS: &[&str] = &["DIR", "DIRFROM", "DIST", "DISTFROM", "EITHER", "OPP", "STEP"];

fn defined_value_for(upper: &str) -> Option<DefinedValue> {
    Some(match upper {
        "N" => DefinedValue::N,
        "NW" => DefinedValue::Nw,
        "W" => DefinedValue::W,
        "SW" => DefinedValue::Sw,
        "S" => DefinedValue::S,
        "SE" => DefinedValue::Se,
        "E" => DefinedValue::E,
        "NE" => DefinedValue::Ne,
        "HS" => DefinedValue::Hs,
        "MM" => DefinedValue::Mm,
        "SH" => DefinedValue::Sh,
        "JS" => DefinedValue::Js,
        "GV" => DefinedValue::Gv,
        "M" => DefinedValue::M,
        "DM" => DefinedValue::Dm,
        _ => return None,
    })
}

fn variable_for(upper: &str) -> Option<Variable> {
    Some(match upper {
        "A" => Variable::A,
        "B" => Variable::B,
        "C" => Variable::C,
        "D" => Variable::D,
        "X" => Variable::X,
        "Y" => Variable::Y,
        "Z" => Variable::Z,
        "DOF" => Variable::Dof,
        "DOH" => Variable::Doh,
        _ => return None,
    })
}

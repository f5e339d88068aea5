use regex::Regex;
use st_core::SigTableError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildConstraint {
    Tag(String),
    Not(Box<BuildConstraint>),
    And(Box<BuildConstraint>, Box<BuildConstraint>),
    Or(Box<BuildConstraint>, Box<BuildConstraint>),
}

impl BuildConstraint {
    pub fn eval(&self, has_tag: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(tag) => has_tag(tag),
            Self::Not(inner) => !inner.eval(has_tag),
            Self::And(left, right) => left.eval(has_tag) && right.eval(has_tag),
            Self::Or(left, right) => left.eval(has_tag) || right.eval(has_tag),
        }
    }
}

pub fn find_build_constraint(source: &str) -> Option<String> {
    let regex = Regex::new(r"(?m)^//go:build\s+(.+?)\s*$").expect("build regex must compile");
    let header_end = Regex::new(r"(?m)^package\s")
        .expect("package regex must compile")
        .find(source)
        .map_or(source.len(), |found| found.start());
    regex
        .captures(&source[..header_end])
        .and_then(|caps| caps.get(1))
        .map(|expr| expr.as_str().to_string())
}

pub fn parse_build_constraint(expr: &str) -> Result<BuildConstraint, SigTableError> {
    let tokens = tokenize(expr)?;
    let mut parser = ConstraintParser {
        tokens: &tokens,
        pos: 0,
        expr,
    };
    let constraint = parser.parse_or()?;
    if parser.pos != tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(constraint)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConstraintToken {
    Tag(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<ConstraintToken>, SigTableError> {
    let chars = expr.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        match ch {
            ' ' | '\t' => idx += 1,
            '!' => {
                tokens.push(ConstraintToken::Not);
                idx += 1;
            }
            '(' => {
                tokens.push(ConstraintToken::LParen);
                idx += 1;
            }
            ')' => {
                tokens.push(ConstraintToken::RParen);
                idx += 1;
            }
            '&' | '|' if chars.get(idx + 1) == Some(&ch) => {
                tokens.push(if ch == '&' {
                    ConstraintToken::And
                } else {
                    ConstraintToken::Or
                });
                idx += 2;
            }
            _ if ch.is_alphanumeric() || ch == '_' || ch == '.' => {
                let start = idx;
                while idx < chars.len()
                    && (chars[idx].is_alphanumeric() || chars[idx] == '_' || chars[idx] == '.')
                {
                    idx += 1;
                }
                tokens.push(ConstraintToken::Tag(chars[start..idx].iter().collect()));
            }
            _ => {
                return Err(SigTableError::new(
                    "GO_BUILD_CONSTRAINT",
                    format!("Invalid character '{}' in build constraint \"{}\".", ch, expr),
                ))
            }
        }
    }
    Ok(tokens)
}

struct ConstraintParser<'a> {
    tokens: &'a [ConstraintToken],
    pos: usize,
    expr: &'a str,
}

impl ConstraintParser<'_> {
    fn parse_or(&mut self) -> Result<BuildConstraint, SigTableError> {
        let mut left = self.parse_and()?;
        while self.eat(&ConstraintToken::Or) {
            let right = self.parse_and()?;
            left = BuildConstraint::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<BuildConstraint, SigTableError> {
        let mut left = self.parse_not()?;
        while self.eat(&ConstraintToken::And) {
            let right = self.parse_not()?;
            left = BuildConstraint::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<BuildConstraint, SigTableError> {
        if self.eat(&ConstraintToken::Not) {
            return Ok(BuildConstraint::Not(Box::new(self.parse_not()?)));
        }
        match self.tokens.get(self.pos).cloned() {
            Some(ConstraintToken::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                if !self.eat(&ConstraintToken::RParen) {
                    return Err(self.error("missing ')'"));
                }
                Ok(inner)
            }
            Some(ConstraintToken::Tag(tag)) => {
                self.pos += 1;
                Ok(BuildConstraint::Tag(tag))
            }
            _ => Err(self.error("expected build tag")),
        }
    }

    fn eat(&mut self, token: &ConstraintToken) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> SigTableError {
        SigTableError::new(
            "GO_BUILD_CONSTRAINT",
            format!("{} in build constraint \"{}\".", message, self.expr),
        )
    }
}

#[cfg(test)]
mod constraint_tests {
    use super::*;

    fn eval(expr: &str, tags: &[&str]) -> bool {
        parse_build_constraint(expr)
            .expect("constraint should parse")
            .eval(&|tag| tags.contains(&tag))
    }

    #[test]
    fn finds_go_build_line_before_package_clause_only() {
        let source = "// Copyright\n\n//go:build linux && !cgo\n\npackage os\n\n//go:build ignore\n";
        assert_eq!(
            find_build_constraint(source).as_deref(),
            Some("linux && !cgo")
        );
        assert_eq!(find_build_constraint("package os\n//go:build ignore\n"), None);
    }

    #[test]
    fn evaluates_precedence_and_parentheses() {
        assert!(eval("linux && amd64 || windows", &["windows"]));
        assert!(!eval("linux && (amd64 || arm64)", &["linux"]));
        assert!(eval("linux && (amd64 || arm64)", &["linux", "arm64"]));
        assert!(eval("!ignore", &[]));
        assert!(!eval("!!ignore", &[]));
        assert!(eval("go1.21 && unix", &["go1.21", "unix"]));
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expr in ["linux &&", "(linux", "linux & amd64", "linux amd64"] {
            let error = parse_build_constraint(expr).expect_err("expression should fail");
            assert_eq!(error.code, "GO_BUILD_CONSTRAINT", "{}", expr);
        }
    }
}

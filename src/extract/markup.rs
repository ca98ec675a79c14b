//! Minimal start-tag scanner for server-rendered pages
//!
//! The game pages are not well-formed enough for a DOM, and we only ever need
//! start tags, their attributes and the text right behind them. Everything
//! here borrows from the page body.

use nom::branch::alt;
use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::{char, digit1, i32 as signed, multispace0, multispace1};
use nom::combinator::{map_res, opt};
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair, terminated};
use nom::{IResult, Parser};

/// A start tag found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    attrs: Vec<(&'a str, &'a str)>,
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
}

impl<'a> Tag<'a> {
    /// Attribute value (names compare case-insensitively)
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Text between this tag and the next tag
    pub fn text_after(&self, body: &'a str) -> &'a str {
        let rest = &body[self.end..];
        let stop = rest.find('<').unwrap_or(rest.len());
        rest[..stop].trim()
    }

    /// Everything between this tag and `closing` (or the end of the page)
    pub fn inner_until(&self, body: &'a str, closing: &str) -> &'a str {
        let rest = &body[self.end..];
        let stop = rest.find(closing).unwrap_or(rest.len());
        &rest[..stop]
    }
}

fn name(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')).parse(i)
}

fn attr_value(i: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        take_while1(|c: char| !c.is_whitespace() && c != '>'),
    ))
    .parse(i)
}

fn attribute(i: &str) -> IResult<&str, (&str, &str)> {
    let (i, _) = multispace1(i)?;
    let (i, key) = name(i)?;
    let (i, value) = opt(preceded((multispace0, char('='), multispace0), attr_value)).parse(i)?;
    Ok((i, (key, value.unwrap_or(""))))
}

fn start_tag(i: &str) -> IResult<&str, (&str, Vec<(&str, &str)>)> {
    let (i, _) = char('<').parse(i)?;
    let (i, tag_name) = name(i)?;
    let (i, attrs) = many0(attribute).parse(i)?;
    let (i, _) = (multispace0, opt(char('/')), char('>')).parse(i)?;
    Ok((i, (tag_name, attrs)))
}

/// All start tags named `wanted`, in page order
pub fn tags<'a>(body: &'a str, wanted: &str) -> Vec<Tag<'a>> {
    body.match_indices('<')
        .filter_map(|(start, _)| {
            let (remaining, (tag_name, attrs)) = start_tag(&body[start..]).ok()?;
            if !tag_name.eq_ignore_ascii_case(wanted) {
                return None;
            }
            Some(Tag {
                name: tag_name,
                attrs,
                start,
                end: body.len() - remaining.len(),
            })
        })
        .collect()
}

/// First tag named `wanted` whose attribute `attr` equals `value`
pub fn find_tag<'a>(body: &'a str, wanted: &str, attr: &str, value: &str) -> Option<Tag<'a>> {
    tags(body, wanted)
        .into_iter()
        .find(|t| t.attr(attr) == Some(value))
}

fn integer(i: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>).parse(i)
}

fn label_gap(i: &str) -> IResult<&str, ()> {
    let (i, _) = (multispace0, opt(char(':')), multispace0).parse(i)?;
    Ok((i, ()))
}

/// First integer following `marker` (an optional colon may sit between them)
pub fn number_after(body: &str, marker: &str) -> Option<u64> {
    let idx = body.find(marker)?;
    let rest = &body[idx + marker.len()..];
    preceded(label_gap, integer).parse(rest).ok().map(|(_, n)| n)
}

/// `owned/max` pair following `marker`
pub fn ratio_after(body: &str, marker: &str) -> Option<(u64, u64)> {
    let idx = body.find(marker)?;
    let rest = &body[idx + marker.len()..];
    preceded(
        label_gap,
        separated_pair(integer, (multispace0, char('/'), multispace0), integer),
    )
    .parse(rest)
    .ok()
    .map(|(_, pair)| pair)
}

/// Signed `(a,b)` pair following `marker`
pub fn pair_after(body: &str, marker: &str) -> Option<(i32, i32)> {
    let idx = body.find(marker)?;
    signed_pair(&body[idx + marker.len()..]).ok().map(|(_, pair)| pair)
}

fn signed_pair(i: &str) -> IResult<&str, (i32, i32)> {
    delimited(
        (char('('), multispace0),
        separated_pair(signed, (multispace0, char(','), multispace0), signed),
        (multispace0, char(')')),
    )
    .parse(i)
}

/// Percentage such as `45%` or `45 %`, rejected above 100
pub fn percent(text: &str) -> Option<u8> {
    let (_, value) = preceded(
        multispace0,
        terminated(integer, (multispace0, opt(char('%')))),
    )
    .parse(text)
    .ok()?;
    u8::try_from(value).ok().filter(|v| *v <= 100)
}

/// Amount written with group separators, e.g. `12 345 $`
pub fn grouped_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '$')
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Numeric id at the end of a link such as `carte.php?pokemon_actif=12`
pub fn id_after_prefix(href: &str, prefix: &str) -> Option<u32> {
    let rest = href.strip_prefix(prefix)?;
    let (_, id) = integer(rest).ok()?;
    u32::try_from(id).ok()
}

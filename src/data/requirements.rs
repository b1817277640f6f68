use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use anyhow::{bail, Context};
use regex::Regex;
use crate::data::FsAccess;
use crate::utils;

/// File name looked up in the working directory when no path is given.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

const NAME_PATTERN: &str = r"[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?";

fn requirement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"^(?P<name>{})\s*(?:\[(?P<extras>[^\]]*)\])?\s*(?:@\s*(?P<url>[^\s;]+)|(?P<spec>[^;@]*))\s*(?:;\s*(?P<marker>.*))?$",
            NAME_PATTERN);
        Regex::new(&pattern).expect("requirement pattern is valid")
    })
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{}$", NAME_PATTERN)).expect("name pattern is valid"))
}

fn version_clause_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<op>~=|===|==|!=|<=|>=|<|>)\s*(?P<version>[A-Za-z0-9][A-Za-z0-9.*+!_-]*)$")
            .expect("version clause pattern is valid")
    })
}

// VCS and archive links pip accepts on a line of their own.
fn direct_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(?:git|hg|svn|bzr)\+[A-Za-z]+://|https?://|file://)\S+$")
            .expect("direct url pattern is valid")
    })
}

fn egg_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"[#&]egg=(?P<name>{})", NAME_PATTERN)).expect("egg pattern is valid")
    })
}

fn archive_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<name>.+?)-\d").expect("archive name pattern is valid"))
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|\s)#.*$").expect("comment pattern is valid"))
}

/// One dependency specifier, e.g. `numpy>=1.21` or `pkg[extra] @ https://...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    /// Version clauses like `>=1.2`, in file order.
    pub specifiers: Vec<String>,
    pub url: Option<String>,
    pub marker: Option<String>,
}

impl Requirement {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        if direct_url_regex().is_match(line) {
            return Self::from_url(line);
        }

        let caps = match requirement_regex().captures(line) {
            Some(caps) => caps,
            None => bail!("Invalid requirement: '{}'", line),
        };

        let name = caps["name"].to_string();

        let mut extras = Vec::new();
        if let Some(raw) = caps.name("extras") {
            for extra in raw.as_str().split(',').map(str::trim).filter(|x| !x.is_empty()) {
                if !name_regex().is_match(extra) {
                    bail!("Invalid extra '{}' in requirement '{}'", extra, line);
                }
                extras.push(extra.to_string());
            }
        }
        extras.sort();

        let mut specifiers = Vec::new();
        if let Some(raw) = caps.name("spec") {
            let raw = raw.as_str().trim();
            let raw = raw.strip_prefix('(')
                .and_then(|x| x.strip_suffix(')'))
                .unwrap_or(raw);
            for clause in raw.split(',').map(str::trim).filter(|x| !x.is_empty()) {
                let clause_caps = match version_clause_regex().captures(clause) {
                    Some(c) => c,
                    None => bail!("Invalid version specifier '{}' in requirement '{}'", clause, line),
                };
                specifiers.push(format!("{}{}", &clause_caps["op"], &clause_caps["version"]));
            }
        }

        let url = caps.name("url").map(|x| x.as_str().to_string());
        let marker = caps.name("marker")
            .map(|x| x.as_str().trim().to_string())
            .filter(|x| !x.is_empty());

        Ok(Self { name, extras, specifiers, url, marker })
    }

    /// A bare VCS or archive link. The project name comes from `#egg=` when
    /// present, otherwise from the last path segment of the link.
    pub fn from_url(url: &str) -> anyhow::Result<Self> {
        let name = match egg_regex().captures(url) {
            Some(caps) => caps["name"].to_string(),
            None => name_from_url(url)
                .ok_or_else(|| anyhow::anyhow!("Can't tell the project name of '{}', add #egg=<name>", url))?,
        };

        Ok(Self {
            name,
            extras: Vec::new(),
            specifiers: Vec::new(),
            url: Some(url.to_string()),
            marker: None,
        })
    }
}

// `.../imgaug.git@v0.4` -> `imgaug`, `.../shapely-1.7.1.tar.gz` -> `shapely`
fn name_from_url(url: &str) -> Option<String> {
    let path = url.split(['#', '?']).next()?.trim_end_matches('/');
    let after_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
    // The host alone doesn't name a project
    let (_, url_path) = after_scheme.split_once('/')?;
    let segment = url_path.rsplit('/').next()?;
    let segment = segment.split('@').next()?;

    let mut stem = segment;
    for suffix in [".git", ".tar.gz", ".tar.bz2", ".tgz", ".zip", ".whl"] {
        if let Some(x) = stem.strip_suffix(suffix) {
            stem = x;
            break;
        }
    }
    let stem = archive_name_regex().captures(stem)
        .and_then(|caps| caps.name("name"))
        .map_or(stem, |m| m.as_str());

    if name_regex().is_match(stem) { Some(stem.to_string()) } else { None }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        match &self.url {
            Some(url) => write!(f, " @ {}", url)?,
            None => write!(f, "{}", self.specifiers.join(","))?,
        }
        if let Some(marker) = &self.marker {
            // A url needs the space so the marker isn't read as part of it
            if self.url.is_some() {
                write!(f, " ; {}", marker)?;
            } else {
                write!(f, "; {}", marker)?;
            }
        }
        Ok(())
    }
}

/// `requirements.txt` in the working directory.
pub fn default_requirements_path() -> PathBuf {
    FsAccess::Current.raw_path()
        .map(|d| d.join(REQUIREMENTS_FILE))
        .unwrap_or_else(|_| PathBuf::from(REQUIREMENTS_FILE))
}

/// Reads a pip requirements file.
///
/// Blank lines and `#` comments are ignored, lines ending in `\` are joined
/// with the next one, and `-r`/`--requirement` includes are followed relative
/// to the including file. A file included from several places is read each
/// time; only an include cycle is an error.
///
/// Requirement lines are PEP 508 specifiers or bare VCS/archive links
/// (`git+https://...`, `https://.../pkg-1.0.tar.gz`). `-e`/`--editable` with
/// a link is read like a bare link; an editable local path has no project
/// name to report and is skipped with a warning. Other option lines
/// (`--index-url`, `-c`, ...) are skipped. Anything else that can't be
/// parsed fails the whole file.
pub fn parse_requirements<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Requirement>> {
    let mut include_stack = Vec::new();
    let mut requirements = Vec::new();
    parse_into(path.as_ref(), &mut include_stack, &mut requirements)?;
    Ok(requirements)
}

fn parse_into(path: &Path, include_stack: &mut Vec<PathBuf>, out: &mut Vec<Requirement>) -> anyhow::Result<()> {
    let key = path.canonicalize()
        .with_context(|| format!("Requirements file not found: {}", path.display()))?;
    if include_stack.contains(&key) {
        bail!("Requirements file {} includes itself", path.display());
    }
    include_stack.push(key);
    parse_lines(path, include_stack, out)?;
    include_stack.pop();
    Ok(())
}

fn parse_lines(path: &Path, include_stack: &mut Vec<PathBuf>, out: &mut Vec<Requirement>) -> anyhow::Result<()> {
    let lines = utils::file_to_vec(path)
        .with_context(|| format!("Failed to read requirements file {}", path.display()))?;

    for (line_no, line) in join_continuations(lines) {
        let line = comment_regex().replace(&line, "");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('-') {
            if let Some(include) = option_value(line, "-r", "--requirement") {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                parse_into(&base.join(include), include_stack, out)?;
            } else if let Some(target) = option_value(line, "-e", "--editable") {
                if direct_url_regex().is_match(target) {
                    let requirement = Requirement::from_url(target)
                        .with_context(|| format!("{}:{}", path.display(), line_no))?;
                    out.push(requirement);
                } else {
                    log::warn!("Skipping editable local path '{}' at {}:{}", target, path.display(), line_no);
                }
            } else {
                log::debug!("Skipping option '{}' at {}:{}", line, path.display(), line_no);
            }
            continue;
        }

        let requirement = Requirement::parse(line)
            .with_context(|| format!("{}:{}", path.display(), line_no))?;
        out.push(requirement);
    }
    Ok(())
}

// Pairs each logical line with the 1-based number of its first physical line.
fn join_continuations(lines: Vec<String>) -> Vec<(usize, String)> {
    let mut joined = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (i, line) in lines.into_iter().enumerate() {
        let (start, mut acc) = pending.take().unwrap_or((i + 1, String::new()));
        match line.strip_suffix('\\') {
            Some(head) => {
                acc.push_str(head);
                pending = Some((start, acc));
            }
            None => {
                acc.push_str(&line);
                joined.push((start, acc));
            }
        }
    }
    if let Some(rest) = pending {
        joined.push(rest);
    }
    joined
}

// Value of `-x value`, `-xvalue`, `--long value` or `--long=value`.
fn option_value<'a>(line: &'a str, short: &str, long: &str) -> Option<&'a str> {
    let rest = if let Some(rest) = line.strip_prefix(long) {
        if !(rest.starts_with('=') || rest.starts_with(char::is_whitespace)) {
            return None;
        }
        rest.strip_prefix('=').unwrap_or(rest)
    } else if line.starts_with("--") {
        return None;
    } else {
        line.strip_prefix(short)?
    };
    let target = rest.trim();
    if target.is_empty() { None } else { Some(target) }
}

/// The install requirements as strings. A missing or malformed file is not
/// fatal: a warning is logged and the list is empty.
pub fn load_install_requires<P: AsRef<Path>>(path: P) -> Vec<String> {
    match parse_requirements(path.as_ref()) {
        Ok(requirements) => requirements.iter().map(|r| r.to_string()).collect(),
        Err(e) => {
            log::warn!("Failed to load requirements file, using default ones. Error: {:#}", e);
            Vec::new()
        }
    }
}

//! Text post-passes: term-typo fix-up and CJK/Western auto-spacing.
//!
//! Both walk the finished AST and rewrite text-node tokens only.  Link
//! labels are skipped so a term visually adjacent to its destination in
//! source can never corrupt the URL.

use phf::phf_map;

use crate::nodes::{AstNode, NodeValue};
use crate::scanners::is_ascii_punct;
use crate::tokens::{decode_rune, Item, Tokens};

/// Fix the capitalization of known terms in every text node outside link
/// labels.
pub fn fix_term_typo<'a>(node: &'a AstNode<'a>) {
    let mut child = node.first_child();
    while let Some(cur) = child {
        let next = cur.next_sibling();
        let is_text = matches!(cur.data.borrow().value, NodeValue::Text);
        let parent_is_link = cur
            .parent()
            .map_or(false, |p| matches!(p.data.borrow().value, NodeValue::Link));
        if is_text && !parent_is_link {
            fix_term_typo0(&mut cur.data.borrow_mut().tokens);
        } else {
            fix_term_typo(cur);
        }
        child = next;
    }
}

fn fix_term_typo0(tokens: &mut Tokens) {
    let length = tokens.len();
    let mut i = 0;
    while i < length {
        let token = tokens[i].term;
        if is_not_term(token) {
            i += 1;
            continue;
        }

        let before = if i >= 1 { tokens[i - 1].term } else { 0 };
        if i >= 1 && !is_not_term(before) {
            // Not at a term boundary.
            i += 1;
            continue;
        }
        if is_ascii_punct(before) {
            // A term after `.` may be part of a filename or hostname;
            // leave test.html and github.com alone.
            i += 1;
            continue;
        }

        let mut j = i;
        let mut after = 0u8;
        while j < length {
            after = tokens[j].term;
            if is_not_term(after) || after == b'.' {
                break;
            }
            j += 1;
        }
        if j < length && is_ascii_punct(after) {
            i = j;
            continue;
        }

        let original: String = tokens[i..j]
            .iter()
            .map(|t| t.term.to_ascii_lowercase() as char)
            .collect();
        if let Some(to) = TERMS.get(original.as_str()) {
            for (k, b) in to.bytes().enumerate() {
                tokens[i + k].term = b;
            }
        }

        i = j.max(i + 1);
    }
}

fn is_not_term(token: u8) -> bool {
    token >= 0x80 || token == 0 || token.is_ascii_whitespace() || is_ascii_punct(token)
}

/// Insert a space between CJK and Western letters or digits.
pub fn auto_space<'a>(node: &'a AstNode<'a>) {
    let mut child = node.first_child();
    while let Some(cur) = child {
        let next = cur.next_sibling();
        let is_text = matches!(cur.data.borrow().value, NodeValue::Text);
        let parent_is_link = cur
            .parent()
            .map_or(false, |p| matches!(p.data.borrow().value, NodeValue::Link));
        if is_text && !parent_is_link {
            let spaced = space_text(&cur.data.borrow().tokens);
            cur.data.borrow_mut().tokens = spaced;
        } else {
            auto_space(cur);
        }
        child = next;
    }
}

fn space_text(tokens: &[Item]) -> Tokens {
    let mut out = Tokens::with_capacity(tokens.len());
    let mut prev: Option<char> = None;
    let mut i = 0;
    while i < tokens.len() {
        let (c, width) = decode_rune(&tokens[i..]);
        if let Some(p) = prev {
            if (is_cjk(p) && c.is_ascii_alphanumeric()) || (p.is_ascii_alphanumeric() && is_cjk(c))
            {
                out.push(Item::new(b' '));
            }
        }
        out.extend_from_slice(&tokens[i..i + width.max(1)]);
        prev = Some(c);
        i += width.max(1);
    }
    out
}

fn is_cjk(c: char) -> bool {
    matches!(
        u32::from(c),
        0x3040..=0x30ff      // kana
            | 0x3400..=0x4dbf // CJK extension A
            | 0x4e00..=0x9fff // CJK unified
            | 0xac00..=0xd7a3 // hangul
            | 0xf900..=0xfaff // CJK compatibility
    )
}

// The term dictionary.  Keys are lowercase; every canonical form has the
// same byte length as its key so the fix-up can rewrite in place.
static TERMS: phf::Map<&'static str, &'static str> = phf_map! {
    "jetty" => "Jetty",
    "tomcat" => "Tomcat",
    "jdbc" => "JDBC",
    "mariadb" => "MariaDB",
    "ipfs" => "IPFS",
    "saas" => "SaaS",
    "paas" => "PaaS",
    "iaas" => "IaaS",
    "ioc" => "IoC",
    "freemarker" => "FreeMarker",
    "ruby" => "Ruby",
    "mri" => "MRI",
    "rails" => "Rails",
    "mina" => "Mina",
    "puppet" => "Puppet",
    "vagrant" => "Vagrant",
    "chef" => "Chef",
    "npm" => "NPM",
    "beego" => "Beego",
    "gin" => "Gin",
    "iris" => "Iris",
    "php" => "PHP",
    "ssh" => "SSH",
    "web" => "Web",
    "api" => "API",
    "css" => "CSS",
    "html" => "HTML",
    "json" => "JSON",
    "jsonp" => "JSONP",
    "xml" => "XML",
    "yaml" => "YAML",
    "ini" => "INI",
    "csv" => "CSV",
    "soap" => "SOAP",
    "ajax" => "AJAX",
    "messagepack" => "MessagePack",
    "javascript" => "JavaScript",
    "java" => "Java",
    "jsp" => "JSP",
    "restful" => "RESTFul",
    "gorm" => "GORM",
    "orm" => "ORM",
    "oauth" => "OAuth",
    "facebook" => "Facebook",
    "github" => "GitHub",
    "gist" => "Gist",
    "heroku" => "Heroku",
    "twitter" => "Twitter",
    "youtube" => "YouTube",
    "dynamodb" => "DynamoDB",
    "mysql" => "MySQL",
    "postgresql" => "PostgreSQL",
    "sqlite" => "SQLite",
    "memcached" => "Memcached",
    "mongodb" => "MongoDB",
    "redis" => "Redis",
    "elasticsearch" => "Elasticsearch",
    "solr" => "Solr",
    "solo" => "Solo",
    "sym" => "Sym",
    "b3log" => "B3log",
    "hacpai" => "HacPai",
    "lute" => "Lute",
    "sphinx" => "Sphinx",
    "linux" => "Linux",
    "mac" => "Mac",
    "ubuntu" => "Ubuntu",
    "centos" => "CentOS",
    "centos7" => "CentOS7",
    "redhat" => "RedHat",
    "gitlab" => "GitLab",
    "jquery" => "jQuery",
    "angularjs" => "AngularJS",
    "ffmpeg" => "FFMPEG",
    "git" => "Git",
    "svn" => "SVN",
    "vim" => "VIM",
    "emacs" => "Emacs",
    "sublime" => "Sublime",
    "virtualbox" => "VirtualBox",
    "safari" => "Safari",
    "chrome" => "Chrome",
    "ie" => "IE",
    "firefox" => "Firefox",
    "iterm" => "iTerm",
    "iterm2" => "iTerm2",
    "iwork" => "iWork",
    "itunes" => "iTunes",
    "iphoto" => "iPhoto",
    "ibook" => "iBook",
    "imessage" => "iMessage",
    "photoshop" => "Photoshop",
    "excel" => "Excel",
    "powerpoint" => "PowerPoint",
    "ios" => "iOS",
    "iphone" => "iPhone",
    "ipad" => "iPad",
    "android" => "Android",
    "imac" => "iMac",
    "macbook" => "MacBook",
    "vps" => "VPS",
    "vpn" => "VPN",
    "arm" => "ARM",
    "cpu" => "CPU",
    "spring" => "Spring",
    "springboot" => "SpringBoot",
    "springcloud" => "SpringCloud",
    "sprintmvc" => "SpringMVC",
    "mybatis" => "MyBatis",
    "qq" => "QQ",
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::{items_to_str, str_to_items};

    fn fixed(s: &str) -> String {
        let mut tokens = str_to_items(s);
        fix_term_typo0(&mut tokens);
        items_to_str(&tokens)
    }

    #[test]
    fn fixes_isolated_terms() {
        assert_eq!(fixed("use github for code"), "use GitHub for code");
        assert_eq!(fixed("github"), "GitHub");
        assert_eq!(fixed("mysql and redis"), "MySQL and Redis");
        assert_eq!(fixed("built on lute and solo"), "built on Lute and Solo");
        assert_eq!(fixed("sym posts to hacpai"), "Sym posts to HacPai");
    }

    #[test]
    fn leaves_hostnames_and_filenames_alone() {
        assert_eq!(fixed("see github.com please"), "see github.com please");
        assert_eq!(fixed("open test.html now"), "open test.html now");
        assert_eq!(fixed("x.github"), "x.github");
    }

    #[test]
    fn dictionary_lengths_match() {
        for (k, v) in TERMS.entries() {
            assert_eq!(k.len(), v.len(), "{} -> {}", k, v);
        }
    }

    #[test]
    fn spaces_cjk_boundaries() {
        let spaced = space_text(&str_to_items("用Rust写"));
        assert_eq!(items_to_str(&spaced), "用 Rust 写");
    }
}

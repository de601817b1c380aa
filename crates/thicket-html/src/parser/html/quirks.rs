//! Document mode selection from the DOCTYPE.
//!
//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)

use thicket_dom::QuirksMode;

use crate::tokenizer::Doctype;

/// "The public identifier starts with" one of these: quirks mode.
const QUIRKS_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to" one of these: quirks mode.
const QUIRKS_PUBLIC_IDS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// "The system identifier is set to" this: quirks mode.
const QUIRKS_SYSTEM_ID: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Quirks when the system identifier is missing, limited quirks otherwise.
const HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// "The public identifier starts with" one of these: limited-quirks mode.
const LIMITED_QUIRKS_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

fn starts_with_any(id: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| id.starts_with(prefix))
}

/// Classify a DOCTYPE token.
///
/// Identifiers are compared ASCII case-insensitively.
pub(super) fn classify(doctype: &Doctype) -> QuirksMode {
    let name = doctype.name.as_deref().unwrap_or_default();
    let public = doctype
        .public_identifier
        .as_deref()
        .map(str::to_ascii_lowercase);
    let system = doctype
        .system_identifier
        .as_deref()
        .map(str::to_ascii_lowercase);
    let public_id = public.as_deref().unwrap_or_default();

    // "...then set the Document to quirks mode:"
    if doctype.force_quirks
        || !name.eq_ignore_ascii_case("html")
        || QUIRKS_PUBLIC_IDS.contains(&public_id)
        || system.as_deref() == Some(QUIRKS_SYSTEM_ID)
        || starts_with_any(public_id, QUIRKS_PUBLIC_PREFIXES)
        || (system.is_none() && starts_with_any(public_id, HTML4_PUBLIC_PREFIXES))
    {
        return QuirksMode::Quirks;
    }

    // "Otherwise, if the document is not an iframe srcdoc document, and the
    // DOCTYPE token matches one of the conditions in the following list, then
    // set the Document to limited-quirks mode:"
    if starts_with_any(public_id, LIMITED_QUIRKS_PUBLIC_PREFIXES)
        || (system.is_some() && starts_with_any(public_id, HTML4_PUBLIC_PREFIXES))
    {
        return QuirksMode::LimitedQuirks;
    }

    QuirksMode::NoQuirks
}

/// "If the DOCTYPE token's name is not "html", or the token's public
/// identifier is not missing, or the token's system identifier is neither
/// missing nor "about:legacy-compat", then there is a parse error."
pub(super) fn is_conforming(doctype: &Doctype) -> bool {
    doctype
        .name
        .as_deref()
        .is_some_and(|name| name.eq_ignore_ascii_case("html"))
        && doctype.public_identifier.is_none()
        && doctype
            .system_identifier
            .as_deref()
            .is_none_or(|system| system == "about:legacy-compat")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype(name: &str, public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: Some(name.to_owned()),
            public_identifier: public.map(str::to_owned),
            system_identifier: system.map(str::to_owned),
            ..Doctype::default()
        }
    }

    #[test]
    fn test_html5_doctype_is_standards() {
        let html5 = doctype("html", None, None);
        assert_eq!(classify(&html5), QuirksMode::NoQuirks);
        assert!(is_conforming(&html5));
    }

    #[test]
    fn test_legacy_public_ids() {
        let html32 = doctype("html", Some("-//W3C//DTD HTML 3.2 Final//EN"), None);
        assert_eq!(classify(&html32), QuirksMode::Quirks);

        let transitional = doctype("html", Some("-//W3C//DTD HTML 4.01 Transitional//EN"), None);
        assert_eq!(classify(&transitional), QuirksMode::Quirks);

        let with_system = doctype(
            "html",
            Some("-//W3C//DTD HTML 4.01 Transitional//EN"),
            Some("http://www.w3.org/TR/html4/loose.dtd"),
        );
        assert_eq!(classify(&with_system), QuirksMode::LimitedQuirks);

        let xhtml = doctype("html", Some("-//W3C//DTD XHTML 1.0 Strict//EN"), None);
        assert_eq!(classify(&xhtml), QuirksMode::NoQuirks);
        assert!(!is_conforming(&xhtml));
    }

    #[test]
    fn test_force_quirks_and_wrong_name() {
        let mut forced = doctype("html", None, None);
        forced.force_quirks = true;
        assert_eq!(classify(&forced), QuirksMode::Quirks);
        assert_eq!(classify(&doctype("svg", None, None)), QuirksMode::Quirks);
    }
}

// src/crawl/catalog.rs

//! Catalog document extraction.
//!
//! THREDDS catalogs are XML, but servers in the wild emit documents with
//! unescaped entities and stray markup, so extraction goes through a
//! lenient HTML parser instead of a strict XML one. Only three things are
//! pulled out of a catalog: child catalog references, the service
//! definitions, and the dataset access URLs built from them. Everything
//! else in the document is ignored.
//!
//! Note the parser lowercases element and attribute names, so selectors
//! here use `catalogref`, `urlpath`, `servicename` and so on.

use std::collections::HashMap;
use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::utils::{resolve_url, server_base};

fn selector(cell: &'static OnceLock<Selector>, css: &'static str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("static selector"))
}

fn catalogref_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "catalogref")
}

fn service_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "service")
}

fn dataset_selector() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    selector(&CELL, "dataset")
}

/// One `<service>` definition from a catalog.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub service_type: String,
    pub base: String,
    /// Names of nested services, for compound definitions.
    pub children: Vec<String>,
}

impl Service {
    pub fn is_compound(&self) -> bool {
        self.service_type.eq_ignore_ascii_case("compound")
    }
}

/// Extract child catalog references, resolved against the enclosing
/// catalog's URL. Unresolvable references are logged and skipped.
pub fn child_catalog_refs(catalog_url: &str, body: &str) -> Vec<String> {
    let doc = Html::parse_document(body);
    let mut refs = Vec::new();

    for element in doc.select(catalogref_selector()) {
        let Some(href) = element.value().attr("xlink:href") else {
            continue;
        };
        match resolve_url(catalog_url, href) {
            Ok(resolved) => refs.push(resolved),
            Err(e) => log::warn!("Skipping catalog reference '{href}': {e}"),
        }
    }

    refs
}

/// Every `<service>` in the catalog, keyed by name. Nested members of a
/// compound service appear both as children of the compound and as
/// entries of their own.
pub fn collect_services(body: &str) -> HashMap<String, Service> {
    let doc = Html::parse_document(body);
    let mut services = HashMap::new();

    for element in doc.select(service_selector()) {
        let Some(name) = element.value().attr("name") else {
            continue;
        };
        let service = Service {
            name: name.to_string(),
            service_type: element.value().attr("servicetype").unwrap_or("").to_string(),
            base: element.value().attr("base").unwrap_or("").to_string(),
            children: element
                .select(service_selector())
                .filter_map(|child| child.value().attr("name"))
                .map(str::to_string)
                .collect(),
        };
        services.insert(service.name.clone(), service);
    }

    services
}

/// Collect the access URLs of every dataset served through a service of
/// the requested type.
///
/// A dataset contributes one URL per matching service: the catalog
/// server's `scheme://host[:port]` prefix, the service's base path, and
/// the dataset's `urlPath`, concatenated. Datasets without a `urlPath`
/// (collection containers) and datasets whose service cannot be resolved
/// are skipped.
pub fn dataset_access_urls(catalog_url: &str, body: &str, service_type: &str) -> Vec<String> {
    let server = match server_base(catalog_url) {
        Ok(server) => server,
        Err(e) => {
            log::warn!("Cannot derive server base from '{catalog_url}': {e}");
            return Vec::new();
        }
    };

    let services = collect_services(body);
    let doc = Html::parse_document(body);
    let mut urls = Vec::new();

    for dataset in doc.select(dataset_selector()) {
        let Some(url_path) = dataset.value().attr("urlpath") else {
            continue;
        };
        let Some(service_name) = service_name_of(dataset) else {
            log::debug!("Dataset with urlPath '{url_path}' names no service, skipping");
            continue;
        };
        let Some(service) = services.get(&service_name) else {
            log::warn!("Dataset references undefined service '{service_name}', skipping");
            continue;
        };

        push_access_urls(&server, service, &services, url_path, service_type, &mut urls);
    }

    urls
}

fn push_access_urls(
    server: &str,
    service: &Service,
    services: &HashMap<String, Service>,
    url_path: &str,
    requested: &str,
    out: &mut Vec<String>,
) {
    if service.service_type.eq_ignore_ascii_case(requested) {
        out.push(format!("{server}{}{url_path}", service.base));
    }
    if service.is_compound() {
        for child_name in &service.children {
            if let Some(child) = services.get(child_name) {
                if child.service_type.eq_ignore_ascii_case(requested) {
                    out.push(format!("{server}{}{url_path}", child.base));
                }
            }
        }
    }
}

/// The service name governing a dataset: its own `serviceName` attribute,
/// a `<serviceName>` child, an inherited `<metadata><serviceName>`, or
/// the same looked up on an enclosing dataset.
fn service_name_of(dataset: ElementRef) -> Option<String> {
    let mut current = Some(dataset);
    while let Some(element) = current {
        if element.value().name() == "dataset" {
            if let Some(name) = own_service_name(element) {
                return Some(name);
            }
        }
        current = element.parent().and_then(ElementRef::wrap);
    }
    None
}

fn own_service_name(element: ElementRef) -> Option<String> {
    if let Some(name) = element.value().attr("servicename") {
        return Some(name.to_string());
    }
    if let Some(child) = direct_child(element, "servicename") {
        return Some(element_text(child));
    }
    direct_child(element, "metadata")
        .and_then(|metadata| direct_child(metadata, "servicename"))
        .map(element_text)
}

fn direct_child<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == name)
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

//! Extraction queries against the CoCo correspondence knowledge graph.
//!
//! Each method issues one or more SELECT queries, materializes the typed
//! result sets into frames and composes them (group/aggregate, join, stack)
//! into the dataset tables the portal's analyses are built on. Queries run
//! strictly one after another; every method returns a fresh frame and leaves
//! writing to the caller.

use polars::prelude::*;
use std::collections::HashMap;
use tracing::info;

use crate::convert::DatatypeRegistry;
use crate::endpoint::SparqlClient;
use crate::error::Result;
use crate::materialize::materialize;
use crate::table::{self, Aggregate};

/// Namespace declarations prepended to every query.
pub const PREFIXES: &str = r#"PREFIX bioc: <http://ldf.fi/schema/bioc/>
PREFIX crm: <http://www.cidoc-crm.org/cidoc-crm/>
PREFIX dct: <http://purl.org/dc/terms/>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX schema: <http://schema.org/>
PREFIX skosxl: <http://www.w3.org/2008/05/skos-xl#>
PREFIX text: <http://jena.apache.org/text#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>

PREFIX : <http://ldf.fi/schema/coco/>
PREFIX actors: <http://ldf.fi/coco/actors/>
PREFIX events: <http://ldf.fi/coco/events/>
PREFIX letters: <http://ldf.fi/coco/letters/>
PREFIX places: <http://ldf.fi/coco/places/>
PREFIX portal: <http://ldf.fi/coco/portal/>
"#;

/// Short display labels for the institutional datasource names.
///
/// Presentation only; the extraction tables keep the full names.
pub fn source_short_labels() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("Åbo Akademi University Library", "Åbo Akademi"),
        ("The National Library of Finland", "National Library"),
        ("The National Archives of Finland", "National Archives"),
        ("Finnish Literature Society", "SKS"),
        ("The Society of Swedish Literature in Finland", "SLS"),
        ("J. V. Snellman Letters", "Snellman Letters"),
        ("Elias Lönnrot Letters", "Lönnrot Letters"),
        ("Albert Edelfelt Letters", "Edelfelt Letters"),
        ("Finnish National Gallery", "National Gallery"),
        ("Finnish National Gallery (Word files)", "National Gallery"),
        ("Serlachius Museums", "Serlachius Museums"),
        ("Zacharias Topelius Writings", "Topelius Letters"),
        ("Gallen-Kallela Museum", "Gallen-Kallela Museum"),
        ("Migration Institute of Finland", "Migration Institute"),
        ("Migration Institute of Finland (Word files)", "Migration Institute"),
        ("Postal Museum", "Postal Museum"),
        ("Aalto University Archives", "Aalto University"),
        ("Theatre Museum", "Theatre Museum"),
        ("The Archives of President Urho Kekkonen", "Kekkonen Archives"),
    ])
}

/// Runs the extraction queries against one endpoint.
pub struct Harvester {
    client: SparqlClient,
    registry: DatatypeRegistry,
}

impl Harvester {
    pub fn new(client: SparqlClient) -> Result<Harvester> {
        Ok(Harvester {
            client,
            registry: DatatypeRegistry::new()?,
        })
    }

    /// Prefix the query, execute it and materialize the result set.
    async fn select_frame(&self, query: &str) -> Result<DataFrame> {
        let full_query = format!("{PREFIXES}\n{query}");
        let results = self.client.select(&full_query).await?;
        materialize(&self.registry, &results)
    }

    /// The metadata datasources present in the graph, with English labels.
    pub async fn datasources(&self) -> Result<DataFrame> {
        let query = r#"
    SELECT DISTINCT ?datasource ?label
    WHERE {
      [] a :MetadataRecord ; dct:source ?datasource .
      ?datasource skos:prefLabel ?label .
      FILTER (LANG(?label) = 'en')
    }"#;

        let frame = self.select_frame(query).await?;
        info!(rows = frame.height(), "queried datasources");
        Ok(frame)
    }

    /// Letter and actor counts per datasource, joined and sorted by letter
    /// count, descending.
    ///
    /// The queries fold the "(Word files)" datasource variants into their
    /// parent source by name, which can leave two result rows per key; the
    /// group-sum after materialization merges them.
    pub async fn letter_and_actor_counts(&self) -> Result<DataFrame> {
        let letter_query = r#"
    SELECT DISTINCT ?datasource (COUNT(DISTINCT ?evt) AS ?Letters)
    WHERE {
      ?evt a :Letter .
      ?evt dct:source/skos:prefLabel ?_datasource .
      FILTER (LANG(?_datasource) = "en")
      BIND(REPLACE(STR(?_datasource), " \\(Word files\\)", "") AS ?datasource)
    } GROUP BY ?datasource"#;

        let letters = self.select_frame(letter_query).await?;
        let letters = table::group_agg(letters, "datasource", "Letters", &Aggregate::Sum)?;

        let actor_query = r#"
    SELECT DISTINCT ?datasource (COUNT(DISTINCT ?person) AS ?Actors)
    WHERE {
      ?person a :ProvidedActor .
      ?person1 :proxy_for ?person .
      ?person1 dct:source/skos:prefLabel ?_datasource .
      FILTER (LANG(?_datasource) = "en")
      BIND(REPLACE(STR(?_datasource), " \\(Word files\\)", "") AS ?datasource)
    } GROUP BY ?datasource"#;

        let actors = self.select_frame(actor_query).await?;
        let actors = table::group_agg(actors, "datasource", "Actors", &Aggregate::Sum)?;

        let combined = table::inner_join(letters, actors, "datasource")?;
        let sorted = combined.sort(
            ["Letters"],
            SortMultipleOptions::default().with_order_descending(true),
        )?;

        info!(rows = sorted.height(), "queried letter and actor counts");
        Ok(sorted)
    }

    /// Per-letter metadata for one datasource, identified by its IRI.
    ///
    /// Places and languages fan out per letter, so the query GROUP_CONCATs
    /// them into `;`-separated lists; the converter splits them back into
    /// list cells.
    pub async fn letters_by_source(&self, source_iri: &str) -> Result<DataFrame> {
        let query = r#"
    SELECT DISTINCT ?evt ?date ?datasource ?fonds ?year ?source ?target
      (GROUP_CONCAT(DISTINCT ?_sending_place; separator=";") AS ?sending_place)
      (GROUP_CONCAT(DISTINCT ?_target_place; separator=";") AS ?target_place)
      (GROUP_CONCAT(DISTINCT ?_language; separator=";") AS ?language)
    WHERE {
      ?evt a :Letter .
      ?evt dct:source <SOURCE> .
      <SOURCE> skos:prefLabel ?datasource .
      FILTER (LANG(?datasource) = "en")
      OPTIONAL { ?evt :was_addressed_to/:proxy_for ?target }
      OPTIONAL { ?evt :was_authored_by/:proxy_for ?source }
      OPTIONAL { ?evt :metadata/:sending_date ?date }
      OPTIONAL { ?evt :was_sent_from/skos:prefLabel ?_sending_place }
      OPTIONAL { ?evt :was_sent_to/skos:prefLabel ?_target_place }
      OPTIONAL { ?evt dct:language ?_language }
      OPTIONAL { ?evt :fonds ?fonds }
      OPTIONAL { ?evt :estimated_year ?year }
    } GROUP BY ?evt ?date ?datasource ?fonds ?year ?source ?target"#
            .replace("<SOURCE>", &format!("<{source_iri}>"));

        let frame = self.select_frame(&query).await?;
        info!(
            rows = frame.height(),
            source = source_iri,
            "queried letters for datasource"
        );
        Ok(frame)
    }

    /// Letter metadata of every datasource, stacked into one frame.
    ///
    /// Column dtypes differ between sources (estimated years come back as
    /// integers from some and free text from others), so each frame is
    /// coerced to text before the diagonal concatenation.
    pub async fn all_letters(&self) -> Result<DataFrame> {
        let sources = self.datasources().await?;
        let iris: Vec<String> = sources
            .column("datasource")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();

        let mut frames = Vec::with_capacity(iris.len());
        for iri in &iris {
            let frame = self.letters_by_source(iri).await?;
            frames.push(table::coerce_to_strings(frame)?);
        }

        let stacked = table::stack(&frames)?;
        info!(
            rows = stacked.height(),
            sources = iris.len(),
            "stacked letters from all datasources"
        );
        Ok(stacked)
    }

    /// Biographical attributes per actor: label, type, birth and death year
    /// and place, occupations as a `;`-list.
    pub async fn actor_info(&self) -> Result<DataFrame> {
        let query = r#"
    SELECT DISTINCT ?person
      (SAMPLE(?_label) AS ?label)
      (SAMPLE(?_type) AS ?type)
      (SAMPLE(?_birthyear) AS ?birthyear)
      (SAMPLE(?_deathyear) AS ?deathyear)
      (SAMPLE(?_birthplace) AS ?birthplace)
      (SAMPLE(?_deathplace) AS ?deathplace)
      (GROUP_CONCAT(DISTINCT ?_occ; separator=";") AS ?occupations)
    WHERE {
      ?person a :ProvidedActor .
      ?person1 :proxy_for ?person .
      OPTIONAL { ?person1 skos:prefLabel ?_label }
      OPTIONAL { ?person1 rdf:type/skos:prefLabel ?_type }
      OPTIONAL { ?person1 :birthDate/crm:P82a_begin_of_the_begin ?birthdate . BIND(YEAR(?birthdate) AS ?_birthyear) }
      OPTIONAL { ?person1 :deathDate/crm:P82b_end_of_the_end ?deathdate . BIND(YEAR(?deathdate) AS ?_deathyear) }
      OPTIONAL { ?person1 :was_born_in_location/skos:prefLabel ?_birthplace }
      OPTIONAL { ?person1 :died_at_location/skos:prefLabel ?_deathplace }
      OPTIONAL { ?person ^:proxy_for/bioc:has_occupation/skos:prefLabel ?_occ . FILTER(LANG(?_occ) = 'en') }
    } GROUP BY ?person"#;

        let frame = self.select_frame(query).await?;
        info!(rows = frame.height(), "queried actor biographical info");
        Ok(frame)
    }

    /// Correspondence-network attributes per actor: degrees, correspondence
    /// count, floruit, gender, contributing sources and external links.
    pub async fn provided_actor_info(&self) -> Result<DataFrame> {
        let query = r#"
    SELECT DISTINCT ?person ?out_degree ?in_degree ?num_correspondences ?floruit
      (SAMPLE(?_gender) AS ?gender)
      (GROUP_CONCAT(DISTINCT ?_source; separator=";") AS ?sources)
      (GROUP_CONCAT(DISTINCT ?link; separator=";") AS ?links)
    WHERE {
      ?person a :ProvidedActor .
      OPTIONAL {
        ?person ^:proxy_for/dct:source/skos:prefLabel ?_source .
        FILTER(LANG(?_source) = 'en')
      }
      OPTIONAL { ?person :out_degree ?out_degree }
      OPTIONAL { ?person :in_degree ?in_degree }
      OPTIONAL { ?person :num_correspondences ?num_correspondences }
      OPTIONAL {
        ?person bioc:has_gender/skos:prefLabel ?_gender
        FILTER(LANG(?_gender) = 'en')
      }
      OPTIONAL { ?person owl:sameAs ?link }
      OPTIONAL { ?person :floruit ?floruit }
    } GROUP BY ?person ?out_degree ?in_degree ?num_correspondences ?floruit"#;

        let frame = self.select_frame(query).await?;
        info!(rows = frame.height(), "queried actor network info");
        Ok(frame)
    }

    /// The two actor tables inner-joined on the actor identifier.
    pub async fn actors(&self) -> Result<DataFrame> {
        let info = self.actor_info().await?;
        let provided = self.provided_actor_info().await?;
        let joined = table::inner_join(info, provided, "person")?;

        info!(rows = joined.height(), "joined actor tables");
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_cover_core_namespaces() {
        for namespace in ["bioc:", "crm:", "dct:", "skos:", "xsd:", "actors:"] {
            assert!(
                PREFIXES.contains(&format!("PREFIX {namespace}")),
                "missing prefix {namespace}"
            );
        }
    }

    #[test]
    fn test_word_files_sources_share_short_label() {
        let labels = source_short_labels();
        assert_eq!(
            labels["Finnish National Gallery"],
            labels["Finnish National Gallery (Word files)"]
        );
        assert_eq!(labels["Finnish Literature Society"], "SKS");
    }
}

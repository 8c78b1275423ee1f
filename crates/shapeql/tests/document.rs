//! Assembled documents must be valid GraphQL.

#![allow(dead_code)]

use apollo_parser::Parser;
use shapeql::{Catalog, GraphQLShape, OperationKind};

fn assert_valid(document: &str) {
    let cst = Parser::new(document).parse();
    let errors: Vec<_> = cst.errors().collect();
    assert!(errors.is_empty(), "invalid document {:?}: {:?}", document, errors);
}

#[derive(GraphQLShape)]
struct Owner {
    login: String,
}

#[derive(GraphQLShape)]
struct Issue {
    number: i64,
    #[graphql(tag = "author,alias=owner")]
    author: Owner,
}

#[derive(GraphQLShape)]
struct PullRequest {
    title: String,
    author: Owner,
}

#[derive(GraphQLShape)]
enum SearchHit {
    Issue(Issue),
    PullRequest(PullRequest),
}

#[derive(GraphQLShape)]
struct Repository {
    #[graphql(tag = "search(query: $query:String!, first: $:Int = 10, states: [OPEN, MERGED])")]
    hits: Vec<SearchHit>,
    #[graphql(tag = r#"owner(filter: {login: "octo", minRepos: 2.0})"#)]
    owner: Owner,
}

#[test]
fn query_with_union_fragments_and_variables_parses() {
    let compiled = shapeql::compile::<Repository>().unwrap();
    assert_eq!(compiled.fragments.len(), 1);
    assert_eq!(compiled.variables.len(), 2);
    let document = compiled.to_query_document(Some("Search")).unwrap();
    assert!(document.contains("states: [OPEN, MERGED]"));
    assert!(document.contains("owner(filter: {login: \"octo\", minRepos: 2.0})"));
    assert_valid(&document);
}

#[derive(GraphQLShape)]
struct CreateIssue {
    #[graphql(tag = "createIssue(title: $title:String!, labels: $labels:[ID!] = [])")]
    issue: Issue,
}

#[test]
fn mutation_parses() {
    let compiled = shapeql::compile::<CreateIssue>().unwrap();
    let document = compiled
        .to_document(OperationKind::Mutation, Some("Create"))
        .unwrap();
    assert!(document.starts_with("mutation Create($title: String!, $labels: [ID!] = []) {"));
    assert_valid(&document);
}

#[test]
fn anonymous_operation_parses() {
    let compiled = shapeql::compile::<Owner>().unwrap();
    assert_valid(&compiled.to_query_document(None).unwrap());
}

#[test]
fn catalog_document_parses() {
    let catalog = Catalog::from_toml_str(
        r#"
        namespace = "shop"
        root = "Query"

        [[shapes.Query.fields]]
        name = "products"
        tag = "products(first: $first:Int!, sort: PRICE)"
        type = "[Product!]!"

        [[shapes.Query.fields]]
        name = "featured"
        type = "Product"

        [[shapes.Product.fields]]
        name = "sku"

        [[shapes.Product.fields]]
        name = "price"
        tag = "price(currency: EUR)"
        "#,
    )
    .unwrap();
    let compiled = shapeql::compile_ref(Some(&catalog.root())).unwrap();
    assert_eq!(compiled.fragments[0].name, "ShopProduct");
    assert_valid(&compiled.to_query_document(Some("Products")).unwrap());
}

#[derive(GraphQLShape)]
struct Dashboard {
    #[graphql(tag = "pinned,alias=top")]
    pinned: PullRequest,
    #[graphql(tag = "search(query: $query:String!)")]
    hits: Vec<SearchHit>,
}

#[test]
fn union_variant_selected_elsewhere_parses() {
    let compiled = shapeql::compile::<Dashboard>().unwrap();
    let document = compiled.to_query_document(Some("Dashboard")).unwrap();
    assert!(document.contains("... on PullRequest { ..."));
    assert_valid(&document);
}

#[test]
fn fragment_names_stay_distinct_across_shapes() {
    let catalog = Catalog::from_json_str(
        r#"{
            "namespace": "main",
            "root": "Query",
            "shapes": {
                "Query": {"fields": [
                    {"name": "a", "type": "Item_a"},
                    {"name": "b", "type": "Item_a"},
                    {"name": "c", "type": "ItemA"},
                    {"name": "d", "type": "ItemA"}
                ]},
                "Item_a": {"fields": [{"name": "id"}]},
                "ItemA": {"fields": [{"name": "sku"}]}
            }
        }"#,
    )
    .unwrap();
    let compiled = shapeql::compile_ref(Some(&catalog.root())).unwrap();
    let names: Vec<&str> = compiled.fragments.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["MainItem_a", "MainItemA"]);
    let document = compiled.to_query_document(None).unwrap();
    assert_eq!(document.matches("fragment MainItemA ").count(), 1);
    assert!(document.contains("c{ ...MainItemA }"));
    assert_valid(&document);
}

use find_simsub::{CheckConfig, Document, SimilarityChecker};

fn main() {
    let documents = vec![
        Document {
            id: "hw1-anna".to_string(),
            author_id: "anna".to_string(),
            text: "The industrial revolution transformed the european economy by moving \
                   production from small workshops into large factories powered by steam."
                .to_string(),
        },
        Document {
            id: "hw1-ben".to_string(),
            author_id: "ben".to_string(),
            text: "The industrial revolution transformed the european economy by moving \
                   production from small workshops into large factories powered by steam. \
                   I would add that railways accelerated this shift."
                .to_string(),
        },
        Document {
            id: "hw1-caro".to_string(),
            author_id: "caro".to_string(),
            text: "Impressionist painters abandoned academic conventions and captured \
                   fleeting light with loose visible brushwork outdoors."
                .to_string(),
        },
    ];

    // A checker with the default configuration: word trigrams, 128
    // permutations split into 32 bands of 4 rows, top-3 matches.
    let checker = SimilarityChecker::new(CheckConfig::default()).unwrap();
    let reports = checker.check(&documents).unwrap();

    let report = &reports["hw1-anna"];
    println!(
        "{} scored {:.2}, best match: {}",
        report.document_id, report.overall_score, report.top_matches[0].matched_id
    );
}

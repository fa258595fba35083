use crate::domain::error::{AppError, Result};
use crate::domain::review::AnalysisResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const RESULT_HEADERS: [&str; 4] = ["product_name", "review", "rating", "analysis"];
pub const RESULT_MIME_TYPE: &str = "text/csv";

/// Serializes results as UTF-8 CSV: fixed header, one line per result, no
/// index column. The header is written even when there are no results.
pub fn assemble(results: &[AnalysisResult]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(RESULT_HEADERS)?;
    for result in results {
        writer.write_record([
            result.product_name.as_str(),
            result.review.as_str(),
            result.rating.as_str(),
            result.analysis.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::ResultTable;

    fn result(product: &str, review: &str, rating: &str, analysis: &str) -> AnalysisResult {
        AnalysisResult {
            product_name: product.to_string(),
            review: review.to_string(),
            rating: rating.to_string(),
            analysis: analysis.to_string(),
        }
    }

    fn reparse(bytes: &[u8]) -> (Vec<String>, Vec<AnalysisResult>) {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| {
                let record = record.unwrap();
                result(&record[0], &record[1], &record[2], &record[3])
            })
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_empty_results_emit_header_only() {
        let bytes = assemble(&[]).unwrap();
        assert_eq!(bytes, b"product_name,review,rating,analysis\n");
    }

    #[test]
    fn test_simple_rows_are_unquoted() {
        let bytes = assemble(&[result("Shoe A", "Great fit", "5", "ok")]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "product_name,review,rating,analysis\nShoe A,Great fit,5,ok\n"
        );
    }

    #[test]
    fn test_reparse_matches_source() {
        let source = vec![
            result(
                "Kurta, blue",
                "Said \"nice\"",
                "4",
                "1. Sentiment: Positive\n2. Key points: fabric\n3. Recommendation: Yes",
            ),
            result("Saree", "  spaced  ", "", &AnalysisResult::failure_text("LLM error: 429")),
            result("Jeans", "Ürün güzel 👖", "five", "Neutral"),
        ];

        let (headers, rows) = reparse(&assemble(&source).unwrap());
        assert_eq!(headers, RESULT_HEADERS);
        assert_eq!(rows, source);
    }

    #[test]
    fn test_output_is_deterministic() {
        let table = ResultTable::from(vec![
            result("A", "x", "1", "y"),
            result("B", "z", "2", "w"),
        ]);
        assert_eq!(assemble(table.rows()).unwrap(), assemble(table.rows()).unwrap());
    }
}

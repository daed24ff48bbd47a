//! Console rendering of search results and run reports

use crate::crawler::SiteReport;
use crate::search::SearchResponse;

/// Prints a page of search results
pub fn print_search_results(response: &SearchResponse, offset: usize) {
    println!("Found {} pages\n", response.count);

    for (i, result) in response.results.iter().enumerate() {
        println!("{}. {}", offset + i + 1, result.title);
        println!("   {}{} ({})", result.site, result.uri, result.site_name);
        println!("   Relevance: {:.3}", result.relevance);
        println!("   {}", result.snippet);
        println!();
    }
}

/// Prints the final status of every site of an indexing run
pub fn print_site_reports(reports: &[SiteReport]) {
    println!("=== Indexing Finished ===\n");

    for report in reports {
        match &report.error {
            Some(error) => println!("  {} ({}): {} - {}", report.name, report.url, report.status, error),
            None => println!("  {} ({}): {}", report.name, report.url, report.status),
        }
    }
}

/// CSS class used to colour a command status cell.
pub fn status_class(status: &str) -> &'static str {
    match status {
        "Success" => "status-success",
        "InProgress" | "Pending" => "status-running",
        "Timeout" => "status-warning",
        _ => "status-failed",
    }
}

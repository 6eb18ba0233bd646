// Cross-cutting prompt fragments shared by every analysis prompt.

/// Appended to every user prompt as a final reminder of the output contract.
pub const JSON_ONLY_REMINDER: &str = "\
    Respond with the JSON object only. \
    No prose before or after it, no markdown code fences, no comments inside it.";

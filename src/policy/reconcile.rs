use serde_json::Value;

use super::Grant;

/// Compute the minimal additions that bring `document` into compliance with
/// `grants`.
///
/// For each statement whose `Action` array exactly equals a grant's action
/// set, the grant's resource is appended to the statement's `Resource` array
/// unless it is already present. Nothing is ever removed or reordered, and
/// statements with no matching grant are left untouched, so applying the
/// result a second time yields the same document.
pub fn reconcile(document: &Value, grants: &[Grant]) -> Value {
    let mut updated = document.clone();
    let Some(statements) = updated.get_mut("Statement").and_then(Value::as_array_mut) else {
        return updated;
    };
    for statement in statements {
        for grant in grants {
            if statement.get("Action") != Some(&grant.actions_value()) {
                continue;
            }
            // Statements whose Resource is not an array (e.g. a bare string)
            // keep their shape; the reconciler only ever appends to lists.
            let Some(resources) = statement.get_mut("Resource").and_then(Value::as_array_mut)
            else {
                continue;
            };
            let resource = Value::String(grant.resource.clone());
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn send_message_grant(resource: &str) -> Grant {
        Grant::new(&["sqs:SendMessage"], resource)
    }

    #[test]
    fn appends_missing_resource_to_matching_statement() {
        let document = json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Action": ["sqs:SendMessage"],
                "Resource": ["arn:a:sqs:x:1:old-queue"],
            }],
        });
        let updated = reconcile(&document, &[send_message_grant("arn:a:sqs:x:1:new-queue")]);
        assert_ne!(updated, document);
        assert_eq!(
            updated["Statement"][0]["Resource"],
            json!(["arn:a:sqs:x:1:old-queue", "arn:a:sqs:x:1:new-queue"])
        );
    }

    #[test]
    fn already_present_resource_leaves_document_unchanged() {
        let document = json!({
            "Statement": [{
                "Action": ["sqs:SendMessage"],
                "Resource": ["arn:a:sqs:x:1:old-queue", "arn:a:sqs:x:1:new-queue"],
            }],
        });
        let updated = reconcile(&document, &[send_message_grant("arn:a:sqs:x:1:new-queue")]);
        assert_eq!(updated, document);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let document = json!({
            "Statement": [
                {
                    "Action": ["cloudformation:UpdateStack", "cloudformation:CancelUpdateStack"],
                    "Resource": ["arn:a:cloudformation:x:1:stack/old/*"],
                },
                {
                    "Action": ["sqs:SendMessage"],
                    "Resource": ["arn:a:sqs:x:1:old-queue"],
                },
            ],
        });
        let grants = vec![
            Grant::new(
                &["cloudformation:UpdateStack", "cloudformation:CancelUpdateStack"],
                "arn:a:cloudformation:x:1:stack/new/*",
            ),
            send_message_grant("arn:a:sqs:x:1:new-queue"),
        ];
        let once = reconcile(&document, &grants);
        let twice = reconcile(&once, &grants);
        assert_eq!(once, twice);
    }

    #[test]
    fn existing_resources_and_statements_survive() {
        let document = json!({
            "Statement": [
                {
                    "Sid": "Unrelated",
                    "Action": ["s3:GetObject"],
                    "Resource": ["arn:a:s3:::some-bucket/*"],
                },
                {
                    "Action": ["sqs:SendMessage"],
                    "Resource": ["arn:a:sqs:x:1:queue-one", "arn:a:sqs:x:1:queue-two"],
                },
            ],
        });
        let updated = reconcile(&document, &[send_message_grant("arn:a:sqs:x:1:queue-three")]);
        // Untouched statement, including fields the reconciler knows nothing about.
        assert_eq!(updated["Statement"][0], document["Statement"][0]);
        // Growth is append-only and in order.
        assert_eq!(
            updated["Statement"][1]["Resource"],
            json!(["arn:a:sqs:x:1:queue-one", "arn:a:sqs:x:1:queue-two", "arn:a:sqs:x:1:queue-three"])
        );
    }

    #[test]
    fn action_set_must_match_exactly() {
        let document = json!({
            "Statement": [
                // Superset of the grant's actions: no match.
                {
                    "Action": ["sqs:SendMessage", "sqs:ReceiveMessage"],
                    "Resource": ["arn:a:sqs:x:1:old-queue"],
                },
                // Different order: no match either.
                {
                    "Action": ["cloudformation:CancelUpdateStack", "cloudformation:UpdateStack"],
                    "Resource": [],
                },
            ],
        });
        let grants = vec![
            send_message_grant("arn:a:sqs:x:1:new-queue"),
            Grant::new(
                &["cloudformation:UpdateStack", "cloudformation:CancelUpdateStack"],
                "arn:a:cloudformation:x:1:stack/new/*",
            ),
        ];
        assert_eq!(reconcile(&document, &grants), document);
    }

    #[test]
    fn non_array_resource_is_left_alone() {
        let document = json!({
            "Statement": [{
                "Action": ["sqs:SendMessage"],
                "Resource": "arn:a:sqs:x:1:old-queue",
            }],
        });
        assert_eq!(reconcile(&document, &[send_message_grant("arn:a:sqs:x:1:new-queue")]), document);
    }

    #[test]
    fn document_without_statements_is_returned_as_is() {
        let document = json!({ "Version": "2012-10-17" });
        assert_eq!(reconcile(&document, &[send_message_grant("arn:a:sqs:x:1:q")]), document);
    }
}

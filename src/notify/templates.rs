//! Builders for the notification mails the workflow sends.

use super::Mail;

pub fn new_application(shelter_email: &str, pet_name: &str, applicant_name: &str) -> Mail {
    Mail {
        to: shelter_email.to_string(),
        subject: format!("New Adoption Application for {}", pet_name),
        text_body: format!(
            "You have received a new adoption application for {} from {}.\n\n\
             Please log in to your dashboard to review it.",
            pet_name, applicant_name
        ),
        html_body: format!(
            "<p>You have received a new adoption application for <strong>{}</strong> from {}.</p>\
             <p>Please log in to your dashboard to review it.</p>",
            pet_name, applicant_name
        ),
    }
}

pub fn application_decision(
    applicant_email: &str,
    applicant_name: &str,
    pet_name: &str,
    status: &str,
    notes: Option<&str>,
    frontend_url: &str,
) -> Mail {
    let mut text = format!(
        "Hello {},\n\nThere's an update on your adoption application for {}.\n\nStatus: {}\n",
        applicant_name, pet_name, status
    );
    let mut html = format!(
        "<p>Hello {},</p><p>There's an update on your adoption application for <strong>{}</strong>.</p>\
         <p><strong>Status: {}</strong></p>",
        applicant_name, pet_name, status
    );

    if let Some(notes) = notes {
        text.push_str(&format!("Shelter Notes: {}\n", notes));
        html.push_str(&format!(
            "<p><strong>Shelter Notes:</strong></p><p>{}</p>",
            notes
        ));
    }
    if status == "Approved" {
        text.push_str("\nThe shelter will contact you regarding the next steps.\n");
        html.push_str("<p>The shelter will contact you regarding the next steps.</p>");
    }
    text.push_str(&format!(
        "\nYou can view your application status here: {}/dashboard",
        frontend_url
    ));
    html.push_str(&format!(
        "<p>You can view your application status <a href=\"{}/dashboard\">on your dashboard</a>.</p>",
        frontend_url
    ));

    Mail {
        to: applicant_email.to_string(),
        subject: format!("Update on your adoption application for {}", pet_name),
        text_body: text,
        html_body: html,
    }
}

pub fn password_reset(email: &str, reset_url: &str) -> Mail {
    Mail {
        to: email.to_string(),
        subject: "Password Reset Request for PawHaven".to_string(),
        text_body: format!(
            "You are receiving this email because you (or someone else) have requested the reset \
             of the password for your account.\n\n\
             Please click on the following link, or paste this into your browser to complete the \
             process:\n\n{}\n\n\
             This link will expire in one hour.\n\n\
             If you did not request this, please ignore this email and your password will remain \
             unchanged.\n",
            reset_url
        ),
        html_body: format!(
            "<p>You are receiving this email because you (or someone else) have requested the \
             reset of the password for your account.</p>\
             <p>Please click on the following link, or paste this into your browser to complete \
             the process:</p>\
             <p><a href=\"{url}\">{url}</a></p>\
             <p>This link will expire in one hour.</p>\
             <p>If you did not request this, please ignore this email and your password will \
             remain unchanged.</p>",
            url = reset_url
        ),
    }
}

pub fn password_changed(email: &str) -> Mail {
    Mail {
        to: email.to_string(),
        subject: "Your PawHaven Password Has Been Changed".to_string(),
        text_body: format!(
            "Hello,\n\nThis is a confirmation that the password for your account {} has just \
             been changed.\n",
            email
        ),
        html_body: format!(
            "<p>Hello,</p><p>This is a confirmation that the password for your account {} has \
             just been changed.</p>",
            email
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_mail_includes_notes_when_present() {
        let mail = application_decision(
            "a@example.com",
            "Alice",
            "Buddy",
            "Rejected",
            Some("Home visit required"),
            "http://localhost:5173",
        );
        assert!(mail.text_body.contains("Shelter Notes: Home visit required"));
        assert!(mail.text_body.contains("Status: Rejected"));
        assert!(!mail.text_body.contains("next steps"));
    }

    #[test]
    fn approved_decision_mentions_next_steps() {
        let mail = application_decision(
            "a@example.com",
            "Alice",
            "Buddy",
            "Approved",
            None,
            "http://localhost:5173",
        );
        assert!(mail.text_body.contains("next steps"));
        assert!(mail.html_body.contains("dashboard"));
    }

    #[test]
    fn reset_mail_carries_the_link() {
        let mail = password_reset("a@example.com", "http://localhost:5173/reset-password/abc123");
        assert!(mail.text_body.contains("/reset-password/abc123"));
        assert!(mail.html_body.contains("href=\"http://localhost:5173/reset-password/abc123\""));
    }
}

use crate::models::{AppointmentResponse, Review, UserResponse};

/// "john@doe.com" becomes "j***@d***.com": enough to make the demo look
/// real, not enough to read anyone's address.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return mask_word(email);
    };
    let masked_domain = match domain.rsplit_once('.') {
        Some((host, tld)) => format!("{}***.{}", first_char(host), tld),
        None => format!("{}***", first_char(domain)),
    };
    format!("{}***@{}", first_char(local), masked_domain)
}

/// Everything starred except the last two characters.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 2 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 2), tail)
}

/// First letter kept, the rest starred.
pub fn mask_word(word: &str) -> String {
    if word.is_empty() {
        return "***".to_string();
    }
    format!("{}***", first_char(word))
}

pub fn mask_appointment(mut appointment: AppointmentResponse) -> AppointmentResponse {
    mask_opt(&mut appointment.appointment.client_name, mask_word);
    mask_opt(&mut appointment.appointment.client_phone, mask_phone);
    mask_opt(&mut appointment.appointment.client_email, mask_email);
    mask_opt(&mut appointment.appointment.messenger_contact, mask_phone);
    mask_opt(&mut appointment.user_first_name, mask_word);
    mask_opt(&mut appointment.user_last_name, mask_word);
    mask_opt(&mut appointment.user_email, mask_email);
    appointment
}

pub fn mask_review(mut review: Review) -> Review {
    mask_opt(&mut review.name, mask_word);
    review
}

pub fn mask_user(mut user: UserResponse) -> UserResponse {
    user.email = mask_email(&user.email);
    user.first_name = mask_word(&user.first_name);
    mask_opt(&mut user.last_name, mask_word);
    mask_opt(&mut user.phone, mask_phone);
    user
}

fn mask_opt(value: &mut Option<String>, mask: fn(&str) -> String) {
    if let Some(v) = value {
        *v = mask(v);
    }
}

fn first_char(s: &str) -> String {
    s.chars().next().map(|c| c.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email_standard_shape() {
        assert_eq!(mask_email("john@doe.com"), "j***@d***.com");
        assert_eq!(mask_email("nina.k@studio.example.ge"), "n***@s***.ge");
    }

    #[test]
    fn test_mask_email_degenerate_inputs() {
        assert_eq!(mask_email("not-an-email"), "n***");
        assert_eq!(mask_email("a@b"), "a***@b***");
        assert_eq!(mask_email(""), "***");
    }

    #[test]
    fn test_mask_phone_keeps_two_char_tail() {
        assert_eq!(mask_phone("+995555123456"), "***********56");
        assert_eq!(mask_phone("55"), "***");
        assert_eq!(mask_phone(""), "***");
    }

    #[test]
    fn test_mask_word_keeps_initial() {
        assert_eq!(mask_word("Nina"), "N***");
        assert_eq!(mask_word("ნინო"), "ნ***");
        assert_eq!(mask_word(""), "***");
    }

    #[test]
    fn test_mask_user_covers_all_contact_fields() {
        let user = UserResponse {
            id: 5,
            email: "john@doe.com".to_string(),
            first_name: "John".to_string(),
            last_name: Some("Doe".to_string()),
            phone: Some("599123456".to_string()),
            profile_image_url: None,
            is_admin: false,
            created_at: chrono::Utc::now(),
        };
        let masked = mask_user(user);
        assert_eq!(masked.email, "j***@d***.com");
        assert_eq!(masked.first_name, "J***");
        assert_eq!(masked.last_name.as_deref(), Some("D***"));
        assert_eq!(masked.phone.as_deref(), Some("*******56"));
    }
}

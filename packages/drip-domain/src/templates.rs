/// The four outreach emails, keyed by the stage counter after they are sent:
/// stage 1 = initial, 2 and 3 = follow-ups, 4 = final.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutreachTemplate {
	Initial,
	FollowUp1,
	FollowUp2,
	Final,
}
impl OutreachTemplate {
	pub fn name(self) -> &'static str {
		match self {
			Self::Initial => "initial",
			Self::FollowUp1 => "follow_up_1",
			Self::FollowUp2 => "follow_up_2",
			Self::Final => "final",
		}
	}

	/// The template whose send moves a lead to `stage`.
	pub fn for_stage(stage: i32) -> Option<Self> {
		match stage {
			1 => Some(Self::Initial),
			2 => Some(Self::FollowUp1),
			3 => Some(Self::FollowUp2),
			4 => Some(Self::Final),
			_ => None,
		}
	}

	pub fn stage(self) -> i32 {
		match self {
			Self::Initial => 1,
			Self::FollowUp1 => 2,
			Self::FollowUp2 => 3,
			Self::Final => 4,
		}
	}
}

#[derive(Clone, Debug)]
pub struct TemplateContext<'a> {
	pub lead_name: &'a str,
	pub website_url: &'a str,
	pub checkout_url: &'a str,
	pub signature: &'a str,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedEmail {
	pub subject: String,
	pub html: String,
}

/// Pure string substitution. Same inputs render byte-identical output.
pub fn render(template: OutreachTemplate, ctx: &TemplateContext<'_>) -> RenderedEmail {
	let first = first_name(ctx.lead_name);
	let signature = signature_html(ctx.signature);
	let (subject, body) = match template {
		OutreachTemplate::Initial => (
			format!("{first}, I built a website preview for you"),
			format!(
				"<p>Hi {first},</p>\
				<p>I put together a personal website for your business so you can see \
				exactly what your online presence could look like. It is already live:</p>\
				<p><a href=\"{site}\">{site}</a></p>\
				<p>If you like it, you can claim it in about two minutes here: \
				<a href=\"{checkout}\">{checkout}</a>.</p>\
				<p>{signature}</p>",
				site = ctx.website_url,
				checkout = ctx.checkout_url,
			),
		),
		OutreachTemplate::FollowUp1 => (
			format!("Did you get a chance to look, {first}?"),
			format!(
				"<p>Hi {first},</p>\
				<p>Just floating this back up. The website preview I built for you is \
				still live here:</p>\
				<p><a href=\"{site}\">{site}</a></p>\
				<p>Happy to tweak anything before you claim it: \
				<a href=\"{checkout}\">{checkout}</a>.</p>\
				<p>{signature}</p>",
				site = ctx.website_url,
				checkout = ctx.checkout_url,
			),
		),
		OutreachTemplate::FollowUp2 => (
			"Your website preview is still live".to_string(),
			format!(
				"<p>Hi {first},</p>\
				<p>A quick note that your preview site is still up and getting the \
				occasional visitor:</p>\
				<p><a href=\"{site}\">{site}</a></p>\
				<p>Most agents keep it as-is and are online the same day. Claiming it \
				takes a couple of minutes: <a href=\"{checkout}\">{checkout}</a>.</p>\
				<p>{signature}</p>",
				site = ctx.website_url,
				checkout = ctx.checkout_url,
			),
		),
		OutreachTemplate::Final => (
			format!("Closing out your website preview, {first}"),
			format!(
				"<p>Hi {first},</p>\
				<p>I am tidying up preview sites this week, so this is the last note \
				from me. Yours is here until then:</p>\
				<p><a href=\"{site}\">{site}</a></p>\
				<p>If you want to keep it, claim it any time before it comes down: \
				<a href=\"{checkout}\">{checkout}</a>. Either way, all the best.</p>\
				<p>{signature}</p>",
				site = ctx.website_url,
				checkout = ctx.checkout_url,
			),
		),
	};

	RenderedEmail { subject, html: body }
}

/// Text before the first space, or a neutral fallback for blank names.
pub fn first_name(name: &str) -> &str {
	let trimmed = name.trim();

	if trimmed.is_empty() {
		return "there";
	}

	trimmed.split_whitespace().next().unwrap_or(trimmed)
}

fn signature_html(signature: &str) -> String {
	signature.trim().replace('\n', "<br>")
}

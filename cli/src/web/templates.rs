//! Handlebars templates for the search pages

use handlebars::Handlebars;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{city}} Events and News</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
fieldset { border: 1px solid #ccc; border-radius: 6px; margin-bottom: 1rem; }
label { display: block; margin: 0.4rem 0; }
input[type=text] { width: 100%; padding: 0.4rem; }
.error { background: #fde8e8; border: 1px solid #e0a0a0; padding: 0.6rem; border-radius: 6px; }
.sections { display: grid; grid-template-columns: repeat(auto-fit, minmax(18rem, 1fr)); gap: 1rem; }
.section { border: 1px solid #ddd; border-radius: 6px; padding: 0.6rem 1rem; }
.notes { background: #fff8e1; }
.meta { color: #666; font-size: 0.9rem; }
</style>
</head>
<body>
<h1>{{city}} Events and News</h1>
{{#if error}}<p class="error">{{error}}</p>{{/if}}
{{> search_form form}}
{{#if results}}{{> results results}}{{/if}}
</body>
</html>
"#;

const SEARCH_FORM: &str = r#"<form method="post" action="/search">
<fieldset>
<legend>What would you like to search for?</legend>
<label><input type="radio" name="search_type" value="events"{{#if events_checked}} checked{{/if}}> Events</label>
<label><input type="radio" name="search_type" value="news"{{#if news_checked}} checked{{/if}}> News</label>
<label><input type="radio" name="search_type" value="both"{{#if both_checked}} checked{{/if}}> Both</label>
</fieldset>
<fieldset>
<label>Event type <input type="text" name="event_type" value="{{event_type}}" placeholder="tech meetups, concerts, food festivals"></label>
<label>News topic <input type="text" name="news_topic" value="{{news_topic}}" placeholder="transport, sport, weather"></label>
<label>Maximum budget ({{currency}}): <output id="budget-value">{{budget}}</output>
<input type="range" name="budget" min="0" max="{{budget_max}}" step="{{budget_step}}" value="{{budget}}" oninput="document.getElementById('budget-value').value = this.value"></label>
<label><input type="checkbox" name="any_budget"{{#if any_budget}} checked{{/if}}> Any price</label>
</fieldset>
<button type="submit">Search</button>
</form>
"#;

const RESULTS: &str = r#"<section>
<h2>Results</h2>
<p class="meta">Query: {{query}}<br>City: {{city}}<br>Tools used: {{#if tools_used}}{{#each tools_used}}{{#if @index}}, {{/if}}{{this}}{{/each}}{{else}}none{{/if}}</p>
{{#if stop_notice}}<p class="error">{{stop_notice}}</p>{{/if}}
{{#if summary}}<p>{{summary}}</p>{{/if}}
<div class="sections">
{{#each sections}}
<div class="section{{#if is_notes}} notes{{/if}}">
<h3>{{title}} ({{count}})</h3>
{{#if items}}<ol>
{{#each items}}<li>{{#if href}}<a href="{{href}}" rel="noopener noreferrer" target="_blank">{{text}}</a>{{else}}{{text}}{{/if}}</li>
{{/each}}</ol>{{else}}<p class="meta">None</p>{{/if}}
</div>
{{/each}}
</div>
<p><a download="{{download_name}}" href="{{download_href}}">Download results ({{download_name}})</a></p>
</section>
"#;

/// Registry with every page template and partial
pub fn registry() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(false);
    hb.register_partial("search_form", SEARCH_FORM)?;
    hb.register_partial("results", RESULTS)?;
    hb.register_template_string("page", PAGE)?;
    Ok(hb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_escapes_user_text() {
        let hb = registry().unwrap();
        let html = hb
            .render(
                "page",
                &json!({
                    "city": "Melbourne",
                    "error": "<script>alert(1)</script>",
                    "form": {"events_checked": true, "event_type": "\"jazz\"", "budget": "50"},
                }),
            )
            .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("value=\"events\" checked"));
        assert!(html.contains("value=\"&quot;jazz&quot;\""));
    }

    #[test]
    fn test_results_render_links_and_tools() {
        let hb = registry().unwrap();
        let html = hb
            .render(
                "page",
                &json!({
                    "city": "Melbourne",
                    "form": {},
                    "results": {
                        "query": "Find jazz events in Melbourne Australia",
                        "city": "Melbourne",
                        "tools_used": ["search_events", "filter_by_budget"],
                        "sections": [
                            {"title": "Sources", "count": 1, "items": [
                                {"text": "Lawn - https://example.com/lawn", "href": "https://example.com/lawn"}
                            ]},
                            {"title": "News", "count": 0, "items": []}
                        ],
                        "download_name": "melbourne_events.txt",
                        "download_href": "data:text/plain;base64,AAAA"
                    }
                }),
            )
            .unwrap();
        assert!(html.contains("Tools used: search_events, filter_by_budget"));
        assert!(html.contains("<a href=\"https://example.com/lawn\""));
        assert!(html.contains("<h3>News (0)</h3>"));
        assert!(html.contains("download=\"melbourne_events.txt\""));
    }
}

use aspx_symbols::{parse_page, render_tree, ControlRegistry};

fn render(path: &str, source: &str) -> String {
    let page = parse_page(path, source, &ControlRegistry::with_standard_controls());
    assert!(page.errors.is_empty(), "unexpected errors: {:?}", page.errors);
    render_tree(&page).trim_end().to_string()
}

#[test]
fn test_snapshot_content_page() {
    let source = r#"<%@ Page Language="C#" MasterPageFile="~/Site.master" %>
<asp:Content ID="Body" ContentPlaceHolderID="Main" runat="server">
<asp:GridView ID="Grid" runat="server" AllowPaging="true">
<Columns>
<asp:BoundField DataField="Name" />
</Columns>
<EmptyDataTemplate><b>None</b></EmptyDataTemplate>
</asp:GridView>
</asp:Content>"#;
    insta::assert_snapshot!(render("Default.aspx", source), @r#"
Literal "\n"
Template Body -> Main
  Literal "\n"
  System.Web.UI.WebControls.GridView#Grid ID="Grid" AllowPaging="true"
    .Columns =
      System.Web.UI.WebControls.DataControlFieldCollection
        System.Web.UI.WebControls.BoundField DataField="Name"
    .EmptyDataTemplate =
      System.Web.UI.ITemplate
        Literal "<b>None</b>"
    Literal "\n\n\n"
  Literal "\n"
"#);
}

#[test]
fn test_snapshot_master_page() {
    let source = r#"<%@ Master Language="C#" %>
<html><head runat="server"><title>T</title></head>
<body><form id="f" runat="server"><asp:ContentPlaceHolder ID="Main" runat="server" /></form></body></html>
<script runat="server">
void A() {}
</script>"#;
    insta::assert_snapshot!(render("Site.master", source), @r#"
Literal "\n<html>"
System.Web.UI.HtmlControls.HtmlHead
  Literal "<title>T</title>"
Literal "\n<body>"
System.Web.UI.HtmlControls.HtmlForm#f id="f"
  System.Web.UI.WebControls.ContentPlaceHolder#Main ID="Main"
Literal "</body></html>\n"
Script (3 lines)
"#);
}

#[test]
fn test_snapshot_bindings_and_code() {
    let source = r#"<asp:Label ID="L" runat="server" Text='<%# Eval("Name") %>' /><%= skipped %><%: Shown %>"#;
    insta::assert_snapshot!(render("Default.aspx", source), @r#"
System.Web.UI.WebControls.Label#L ID="L" Text=<%# Eval("Name") %>
Code " Shown "
"#);
}
